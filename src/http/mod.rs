pub mod client;
pub mod reqwest_client;

pub use client::{HttpClient, HttpError, HttpRequest, HttpResponse};
pub use reqwest_client::ReqwestClient;
