pub mod config;
pub mod error;
pub mod events;
pub mod gallery;
pub mod input;
pub mod processing {
    pub mod decode;
    pub mod layout;
    pub mod resize;
    pub mod text;
}
pub mod sources;
pub mod tasks {
    pub mod gallery;
    pub mod presenter;
    pub mod wheel;
}
pub mod thumbnails;
pub mod wheel;
