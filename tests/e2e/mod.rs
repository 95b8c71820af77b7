// End-to-end tests for the audiobook pipeline
//
// Each test gets its own temporary workspace holding the input book, the
// fragment directory and the output file. The real AudiobookService and
// FragmentRepository run against an in-memory TTS provider and an assembler
// that concatenates bytes, so no network access or ffmpeg install is needed.

mod test_failures;
mod test_resume;
