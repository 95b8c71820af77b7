pub mod audiobook;
pub mod chunking;
pub mod tts;
