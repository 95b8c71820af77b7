pub mod audiobook;
pub mod voices;
