/*!
 * End-to-end tests of the paragraph pipeline with in-process providers
 */

use std::sync::Arc;

use fandikana::errors::TranslationError;
use fandikana::providers::mock::MockProvider;
use fandikana::translation::{Direction, TranslationPipeline};

use crate::common::{mock_pipeline, RecordingTranslator};

#[tokio::test]
async fn test_translateParagraph_withEcho_shouldNormalizeSpacing() {
    let pipeline = mock_pipeline(Direction::BmmToMg, MockProvider::echo());

    let translated = pipeline.translate_paragraph("Salama!   Manao ahoana ianao ?").await.unwrap();

    assert_eq!(translated, "Salama! Manao ahoana ianao?");
}

#[tokio::test]
async fn test_translateParagraph_withoutDelimiter_shouldReturnSingleSentence() {
    let pipeline = mock_pipeline(Direction::BmmToMg, MockProvider::echo());

    assert_eq!(pipeline.translate_paragraph("Hello world").await.unwrap(), "Hello world");
}

#[tokio::test]
async fn test_translateParagraph_shouldTranslateEachSentenceOnceInOrder() {
    let translator = Arc::new(RecordingTranslator::new());
    let pipeline = TranslationPipeline::new(Direction::MgToBmm, translator.clone());

    let translated = pipeline.translate_paragraph("Iray. Roa?\nTelo").await.unwrap();

    assert_eq!(translator.calls(), vec!["Iray", "Roa", "Telo"]);
    assert_eq!(translated, "<Iray>. <Roa>?\n <Telo>");
}

#[tokio::test]
async fn test_translateParagraph_providerFailure_shouldReturnNoPartialResult() {
    let provider = MockProvider::intermittent(2);
    let pipeline = mock_pipeline(Direction::BmmToMg, provider.clone());

    let result = pipeline.translate_paragraph("A. B. C.").await;

    assert!(matches!(result, Err(TranslationError::Provider(_))));
    // The third sentence is never sent once the second one failed
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_translateParagraph_shouldPrefixEverySentenceForDirection() {
    let provider = MockProvider::echo().with_custom_response(|req| format!("[{}]{}", req.task_prefix.trim(), req.text));
    let bmm_to_mg = mock_pipeline(Direction::BmmToMg, provider.clone());
    let mg_to_bmm = mock_pipeline(Direction::MgToBmm, provider);

    assert_eq!(
        bmm_to_mg.translate_paragraph("Salama.").await.unwrap(),
        "[translate Betsimisaraka to official Malagasy:]Salama."
    );
    assert_eq!(
        mg_to_bmm.translate_paragraph("Salama.").await.unwrap(),
        "[translate official Malagasy to Betsimisaraka:]Salama."
    );
}

#[tokio::test]
async fn test_translateParagraph_emptyModelOutput_shouldKeepDelimiters() {
    let pipeline = mock_pipeline(Direction::BmmToMg, MockProvider::empty());

    assert_eq!(pipeline.translate_paragraph("Salama. Veloma!").await.unwrap(), ".!");
}

#[tokio::test]
async fn test_pipeline_sharedAcrossTasks_shouldServeConcurrentParagraphs() {
    let pipeline = mock_pipeline(Direction::BmmToMg, MockProvider::echo());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.translate_paragraph(&format!("Fehezanteny {}.", i)).await })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let translated = handle.await.unwrap().unwrap();
        assert_eq!(translated, format!("Fehezanteny {}.", i));
    }
}

#[tokio::test(start_paused = true)]
async fn test_translateParagraph_slowProvider_shouldStillReturnCompleteOrderedParagraph() {
    let provider = MockProvider::slow(200);
    let pipeline = mock_pipeline(Direction::BmmToMg, provider.clone());

    let translated = pipeline.translate_paragraph("Iray. Roa!\nTelo?").await.unwrap();

    assert_eq!(translated, "Iray. Roa!\n Telo?");
    assert_eq!(provider.request_count(), 3);
}
