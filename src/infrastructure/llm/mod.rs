mod mock_completion;
mod openai_client;

pub use mock_completion::MockCompletionClient;
pub use openai_client::OpenAiCompletionClient;
