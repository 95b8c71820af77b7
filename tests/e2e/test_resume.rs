use crate::e2e::helpers;

use audiobook_creator::domain::audiobook::{AudiobookServiceApi, PipelineError};
use audiobook_creator::domain::tts::SynthesisError;
use helpers::fakes::{FakeTts, RecordingObserver};
use helpers::fixtures::{book_with_paragraphs, long_paragraph};
use helpers::TestContext;
use pretty_assertions::assert_eq;
use test_context::test_context;

fn expected_audiobook(paragraphs: usize) -> Vec<u8> {
    (1..=paragraphs)
        .flat_map(|n| FakeTts::audio_for(&long_paragraph(n)))
        .collect()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_resume_from_first_missing_fragment(ctx: &TestContext) {
    let book = ctx.write_book("book.txt", &book_with_paragraphs(5)).await;
    let request = ctx.request(book);

    // First run dies on the fourth fragment
    ctx.tts.fail_when_contains("Paragraph 4 sentence 1.");
    let result = ctx
        .service()
        .create_audiobook(&request, &RecordingObserver::default())
        .await;

    match result {
        Err(PipelineError::RetryExhausted {
            fragment,
            attempts,
            last_error,
        }) => {
            assert_eq!(fragment, 4);
            assert_eq!(attempts, 3);
            assert_eq!(
                last_error,
                SynthesisError::Service("503 Service Unavailable".to_string())
            );
        }
        other => panic!("expected retry exhaustion, got {:?}", other),
    }
    assert_eq!(ctx.tts.call_count(), 6);
    assert_eq!(
        ctx.fragment_files(),
        vec!["chunk_0000.mp3", "chunk_0001.mp3", "chunk_0002.mp3"]
    );
    assert!(!request.output_file.exists());

    // Second run only synthesizes what is missing
    ctx.tts.stop_failing();
    ctx.tts.reset_calls();
    let report = ctx
        .service()
        .create_audiobook(&request, &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(ctx.tts.calls(), vec![long_paragraph(4), long_paragraph(5)]);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.synthesized, 2);

    let audiobook = tokio::fs::read(&request.output_file).await.unwrap();
    assert_eq!(audiobook, expected_audiobook(5));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_call_provider_when_every_fragment_exists(ctx: &TestContext) {
    let book = ctx.write_book("book.txt", &book_with_paragraphs(3)).await;
    let request = ctx.request(book);

    std::fs::create_dir_all(&ctx.fragment_dir).unwrap();
    for n in 1..=3 {
        std::fs::write(
            ctx.fragment_dir.join(format!("chunk_{:04}.mp3", n - 1)),
            FakeTts::audio_for(&long_paragraph(n)),
        )
        .unwrap();
    }

    let report = ctx
        .service()
        .create_audiobook(&request, &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(ctx.tts.call_count(), 0);
    assert_eq!(report.skipped, 3);
    assert_eq!(
        tokio::fs::read(&request.output_file).await.unwrap(),
        expected_audiobook(3)
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_resynthesize_zero_byte_fragments(ctx: &TestContext) {
    let book = ctx.write_book("book.txt", &book_with_paragraphs(3)).await;
    let request = ctx.request(book);

    std::fs::create_dir_all(&ctx.fragment_dir).unwrap();
    std::fs::write(
        ctx.fragment_dir.join("chunk_0000.mp3"),
        FakeTts::audio_for(&long_paragraph(1)),
    )
    .unwrap();
    std::fs::write(ctx.fragment_dir.join("chunk_0001.mp3"), b"").unwrap();
    std::fs::write(
        ctx.fragment_dir.join("chunk_0002.mp3"),
        FakeTts::audio_for(&long_paragraph(3)),
    )
    .unwrap();

    ctx.service()
        .create_audiobook(&request, &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(ctx.tts.calls(), vec![long_paragraph(2)]);
    assert_eq!(
        tokio::fs::read(&request.output_file).await.unwrap(),
        expected_audiobook(3)
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_ignore_interrupted_partial_writes(ctx: &TestContext) {
    let book = ctx.write_book("book.txt", &book_with_paragraphs(2)).await;
    let request = ctx.request(book);

    std::fs::create_dir_all(&ctx.fragment_dir).unwrap();
    std::fs::write(ctx.fragment_dir.join("chunk_0000.mp3.part"), b"[Paragr").unwrap();

    ctx.service()
        .create_audiobook(&request, &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(ctx.tts.calls(), vec![long_paragraph(1), long_paragraph(2)]);
    assert_eq!(
        tokio::fs::read(&request.output_file).await.unwrap(),
        expected_audiobook(2)
    );
}

#[cfg(target_os = "linux")]
#[test_context(TestContext)]
#[tokio::test]
async fn it_should_take_over_lock_left_by_dead_process(ctx: &TestContext) {
    let book = ctx.write_book("book.txt", &book_with_paragraphs(1)).await;

    std::fs::create_dir_all(&ctx.fragment_dir).unwrap();
    std::fs::write(ctx.fragment_dir.join(".lock"), u32::MAX.to_string()).unwrap();

    let report = ctx
        .service()
        .create_audiobook(&ctx.request(book), &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(report.synthesized, 1);
    assert!(!ctx.fragment_dir.exists());
}
