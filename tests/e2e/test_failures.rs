use crate::e2e::helpers;

use audiobook_creator::domain::audiobook::{AudiobookServiceApi, PipelineError};
use audiobook_creator::domain::chunking::ChunkingStrategy;
use audiobook_creator::domain::tts::SynthesisError;
use audiobook_creator::infrastructure::assembler::AssemblyError;
use audiobook_creator::infrastructure::repositories::PollyTtsRepository;
use aws_sdk_polly::types::Engine;
use helpers::aws_mocks::create_unreachable_polly_client;
use helpers::fakes::{FakeTts, RecordingObserver};
use helpers::fixtures::{book_with_paragraphs, long_paragraph};
use helpers::TestContext;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_recover_from_transient_provider_failures(ctx: &TestContext) {
    let book = ctx.write_book("book.txt", &book_with_paragraphs(1)).await;
    ctx.tts.fail_next(2);

    let report = ctx
        .service()
        .create_audiobook(&ctx.request(book), &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(report.synthesized, 1);
    assert_eq!(ctx.tts.call_count(), 3);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stop_at_failing_fragment_without_touching_later_ones(ctx: &TestContext) {
    let book = ctx.write_book("book.txt", &book_with_paragraphs(4)).await;
    let mut request = ctx.request(book);
    request.max_attempts = 1;
    ctx.tts.fail_when_contains("Paragraph 2 sentence 1.");

    let result = ctx
        .service()
        .create_audiobook(&request, &RecordingObserver::default())
        .await;

    assert!(matches!(
        result,
        Err(PipelineError::RetryExhausted {
            fragment: 2,
            attempts: 1,
            ..
        })
    ));
    assert_eq!(ctx.tts.calls(), vec![long_paragraph(1), long_paragraph(2)]);
    assert_eq!(ctx.fragment_files(), vec!["chunk_0000.mp3"]);
    assert!(ctx.assembler.assembled().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_keep_fragments_when_assembly_fails(ctx: &TestContext) {
    let book = ctx.write_book("book.txt", &book_with_paragraphs(3)).await;
    let request = ctx.request(book);
    ctx.assembler.fail_with_invalid_data();

    let result = ctx
        .service()
        .create_audiobook(&request, &RecordingObserver::default())
        .await;

    match result {
        Err(PipelineError::Assembly(AssemblyError::Failed { stderr, .. })) => {
            assert!(stderr.contains("Invalid data found"));
        }
        other => panic!("expected assembly failure, got {:?}", other),
    }
    assert_eq!(
        ctx.fragment_files(),
        vec!["chunk_0000.mp3", "chunk_0001.mp3", "chunk_0002.mp3"]
    );
    assert!(!request.output_file.exists());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_skip_fragments_with_nothing_to_speak(ctx: &TestContext) {
    let book = ctx
        .write_book("book.txt", "Capítulo uno.\n\n* * *\n\nCapítulo dos.")
        .await;
    let mut request = ctx.request(book);
    request.strategy = ChunkingStrategy::Legacy;

    let report = ctx
        .service()
        .create_audiobook(&request, &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(report.total_fragments, 3);
    assert_eq!(report.synthesized, 2);
    assert_eq!(report.empty, 1);

    let assembled = ctx.assembler.assembled();
    assert_eq!(assembled.len(), 1);
    assert_eq!(assembled[0].len(), 2);
    assert!(assembled[0].iter().all(|path| path.is_absolute()));

    let mut expected = FakeTts::audio_for("Capítulo uno.");
    expected.extend(FakeTts::audio_for("Capítulo dos."));
    assert_eq!(tokio::fs::read(&request.output_file).await.unwrap(), expected);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_when_no_fragment_produced_audio(ctx: &TestContext) {
    let book = ctx.write_book("book.txt", "* * *").await;

    let result = ctx
        .service()
        .create_audiobook(&ctx.request(book), &RecordingObserver::default())
        .await;

    assert!(matches!(result, Err(PipelineError::NothingToAssemble)));
    assert!(ctx.assembler.assembled().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_run_when_polly_is_unreachable(ctx: &TestContext) {
    let polly_client = Arc::new(create_unreachable_polly_client().await);
    let polly = Arc::new(PollyTtsRepository::new(polly_client, Engine::Neural));
    let book = ctx.write_book("book.txt", &book_with_paragraphs(2)).await;
    let mut request = ctx.request(book);
    request.max_attempts = 1;

    let result = ctx
        .service_with_tts(polly)
        .create_audiobook(&request, &RecordingObserver::default())
        .await;

    match result {
        Err(PipelineError::RetryExhausted {
            fragment,
            last_error: SynthesisError::Service(message),
            ..
        }) => {
            assert_eq!(fragment, 1);
            assert!(message.starts_with("AWS Polly error"));
        }
        other => panic!("expected Polly failure, got {:?}", other),
    }
    assert!(ctx.fragment_files().is_empty());
    assert_eq!(ctx.inhibitor.released(), 1);
}
