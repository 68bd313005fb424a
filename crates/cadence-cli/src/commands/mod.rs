pub mod add;
pub mod detach;
pub mod edit;
pub mod list;
pub mod r#match;
pub mod preview;
pub mod series;
pub mod summary;
