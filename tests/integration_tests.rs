//! Integration tests for the achuan library.
//! These tests require an API token in the environment to run.

#[cfg(test)]
mod tests {
    use achuan::{Achuan, DEFAULT_MODEL};
    use futures::StreamExt;

    #[tokio::test]
    async fn test_list_sessions() {
        // This test requires ACHUAN_TOKEN to be set
        let token = std::env::var("ACHUAN_TOKEN").ok();
        if token.is_none() {
            eprintln!("Skipping test: ACHUAN_TOKEN not set");
            return;
        }

        let client = Achuan::new(token).expect("Failed to create client");

        let sessions = client.list_sessions().await;
        assert!(sessions.is_ok(), "Listing should succeed with a valid token");
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let token = std::env::var("ACHUAN_TOKEN").ok();
        if token.is_none() {
            eprintln!("Skipping test: ACHUAN_TOKEN not set");
            return;
        }

        let mut client = Achuan::new(token).expect("Failed to create client");

        let id = client
            .create_session(DEFAULT_MODEL)
            .await
            .expect("Session creation should succeed");
        assert_eq!(client.session_id(), Some(id));

        let page = client
            .chat_records(id, 1)
            .await
            .expect("History fetch should succeed");
        assert!(page.records.is_empty(), "New session has no records");

        client
            .delete_session(id)
            .await
            .expect("Session deletion should succeed");
    }

    #[tokio::test]
    async fn test_streaming_completion() {
        let token = std::env::var("ACHUAN_TOKEN").ok();
        if token.is_none() {
            eprintln!("Skipping test: ACHUAN_TOKEN not set");
            return;
        }

        let mut client = Achuan::new(token).expect("Failed to create client");
        let id = client
            .create_session(DEFAULT_MODEL)
            .await
            .expect("Session creation should succeed");

        let mut stream = client.stream_completion("Say 'test passed'", Vec::new()).await;
        let mut received_text = false;
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    if !chunk.is_empty() {
                        received_text = true;
                    }
                }
                Err(e) => panic!("Error in stream: {e}"),
            }
        }
        assert!(received_text, "Expected to receive streamed text");

        let _ = client.delete_session(id).await;
    }
}
