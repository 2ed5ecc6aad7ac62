// src/common/response.rs
//
// Envelope padrão de resposta: { success, data?, count?, message? }.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn of(data: T) -> Self {
        Self { success: true, count: None, data }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// Listagens carregam o `count` junto, como o front espera.
    pub fn list(data: Vec<T>) -> Self {
        let count = data.len();
        Self { success: true, count: Some(count), data }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }
}
