//! Structured request and response bodies.

use http::response::Builder as ResponseBuilder;
use http::{header, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::router::Params;
use crate::{Body, Error, Request, Response};

static NO_PARAMS: Params = Params::new();

/// Accessors route handlers use on a routed request.
pub trait RequestExt {
    /// Path parameters bound by the matched route. Empty if the request was not routed.
    fn params(&self) -> &Params;

    /// Decode the JSON request body.
    fn decode<T: DeserializeOwned>(&self) -> Result<T, Error>;
}

impl RequestExt for Request {
    fn params(&self) -> &Params {
        self.extensions().get::<Params>().unwrap_or(&NO_PARAMS)
    }

    fn decode<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(self.body()).map_err(Error::Decode)
    }
}

/// Encode a value as a JSON `200 OK` response.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Response, Error> {
    let body = serde_json::to_vec(value).map_err(Error::Encode)?;
    Ok(ResponseBuilder::new()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn decodes_body() {
        let req: Request = http::Request::post("/points")
            .body(r#"{"x":1,"y":2}"#.into())
            .unwrap();
        assert_eq!(req.decode::<Point>().unwrap(), Point { x: 1, y: 2 });
        assert!(req.params().is_empty());
    }

    #[test]
    fn rejects_malformed_body() {
        let req: Request = http::Request::post("/points").body("{".into()).unwrap();
        let err = req.decode::<Point>().unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn encodes_response() {
        let res = json(&serde_json::json!({ "token": "abc" })).unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(res.headers()[header::CONTENT_LENGTH], "15");
    }
}
