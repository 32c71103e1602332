use crate::server::api::{self, ApiError, AppState};

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }

    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

pub fn route_request(method: &str, path: &str, body: &str, state: &AppState) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    let result = match (method, path) {
        ("GET", "/api/health") => api::health_payload(state),
        ("GET", "/api/characters") => api::characters_payload(state),
        ("GET", "/api/equipment") => api::equipment_payload(state),
        ("POST", "/api/calculate") => api::calculate_payload(body, state),
        ("POST", "/api/optimize") => api::optimize_payload(body, state),
        ("POST", "/api/optimize/party") => api::optimize_party_payload(body, state),
        (_, "/api/health" | "/api/characters" | "/api/equipment") => {
            return error_response(405, "Method Not Allowed", "Use GET for this route");
        }
        (_, "/api/calculate" | "/api/optimize" | "/api/optimize/party") => {
            return error_response(405, "Method Not Allowed", "Use POST for this route");
        }
        _ => return error_response(404, "Not Found", "Route not found"),
    };

    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(ApiError::Parse(err)) => {
            error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
        }
        Err(ApiError::Validation(validation)) => {
            validation_error_response(400, "Bad Request", validation)
        }
        Err(err @ (ApiError::Compose(_) | ApiError::Optimize(_))) => {
            error_response(422, "Unprocessable Entity", &err.to_string())
        }
        Err(err @ (ApiError::Pool(_) | ApiError::Encode(_))) => {
            error_response(500, "Internal Server Error", &err.to_string())
        }
    }
}

fn validation_error_response(
    status_code: u16,
    status_text: &'static str,
    payload: api::ValidationErrorResponse,
) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
