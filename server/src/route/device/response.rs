use application::transfer::DeviceRentalDto;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DeviceRentalResponse {
    id: i32,
    name: String,
    display_name: String,
}

impl From<DeviceRentalDto> for DeviceRentalResponse {
    fn from(value: DeviceRentalDto) -> Self {
        Self {
            id: value.id,
            name: value.name,
            display_name: value.display_name,
        }
    }
}

impl IntoResponse for DeviceRentalResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::DeviceRentalResponse;
    use application::transfer::DeviceRentalDto;

    #[test]
    fn response_keeps_the_wire_field_names() {
        let response = DeviceRentalResponse::from(DeviceRentalDto {
            id: 1,
            name: "iPhone12".to_string(),
            display_name: "Aydar Ibragimov".to_string(),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "iPhone12");
        assert_eq!(json["display_name"], "Aydar Ibragimov");
    }
}
