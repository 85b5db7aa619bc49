use http::{header, Method, StatusCode};
use http_body_util::BodyExt;
use hyper_staticroute::{json, Error, Request, RequestExt, Responder, RouteMatch, Router};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct LoginInput {
    username: String,
    password: String,
}

#[derive(Serialize, Deserialize)]
struct LoginOutput {
    token: String,
    user: String,
}

fn login_request(path: &str) -> Request {
    let body = serde_json::to_vec(&serde_json::json!({
        "username": "example",
        "password": "test",
    }))
    .unwrap();
    http::Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn login_router() -> Router {
    let mut router = Router::new();
    router.get("/user/:name", |req: Request| async move {
        let input: LoginInput = req.decode()?;
        json(&LoginOutput {
            token: input.username + &input.password,
            user: req.params().get("name").unwrap_or_default().to_owned(),
        })
    });
    router
}

#[test]
fn matches_parameter_route() {
    let router = login_router();
    match router.find(&Method::GET, "/user/joannis/") {
        RouteMatch::Matched { route, params } => {
            assert_eq!(route.pattern().as_str(), "/user/:name");
            assert_eq!(params.get("name"), Some("joannis"));
        }
        RouteMatch::NoMatch => panic!("expected a match"),
    }
    assert!(matches!(
        router.find(&Method::POST, "/user/joannis/"),
        RouteMatch::NoMatch
    ));
}

#[tokio::test]
async fn decodes_body_independently_of_path_parameters() {
    let router = login_router();
    let res = router.respond(login_request("/user/joannis/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    let body = res.into_body().collect().await.unwrap().to_bytes();
    let output: LoginOutput = serde_json::from_slice(&body).unwrap();
    assert_eq!(output.token, "exampletest");
    assert_eq!(output.user, "joannis");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let router = login_router();
    let req = http::Request::get("/user/joannis")
        .body("not json".into())
        .unwrap();
    let err = router.respond(req).await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unmatched_path_is_no_route() {
    let router = login_router();
    let err = router.respond(login_request("/users")).await.unwrap_err();
    assert!(err.is_no_route());
}
