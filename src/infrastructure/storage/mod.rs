mod local_store;
mod mock_store;
mod s3_store;
mod store_factory;

pub use local_store::LocalMediaStore;
pub use mock_store::{FailingMediaStore, InMemoryMediaStore};
pub use s3_store::S3MediaStore;
pub use store_factory::MediaStoreFactory;
