// Item module
// CRUD over the marketplace item collection plus image uploads

pub mod handlers;
pub mod models;
pub mod repository;
pub mod upload;

pub use handlers::{create_item, delete_item, get_item, list_items, update_item};
pub use models::{DeleteItemResponse, Item, NewItem, UpdateItemRequest, UpdateItemResponse};
pub use repository::{InMemoryItemRepository, ItemRepository, PgItemRepository};
pub use upload::{UploadStore, UploadedFile};
