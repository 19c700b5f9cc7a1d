use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, Response},
};
use tower::util::{MapResponse, ServiceExt};

pub(crate) const NO_CACHE_HEADERS: [(HeaderName, &str); 2] = [
    (header::CACHE_CONTROL, "no-cache, no-store"),
    (header::EXPIRES, "-1"),
];

pub(crate) trait NoCacheExt<T>
where
    T: tower::Service<Request<Body>>,
{
    /// Marks every response of the wrapped service as uncacheable.
    fn no_cache(self) -> MapResponse<T, fn(T::Response) -> T::Response>;
}

impl<T, ResponseBody> NoCacheExt<T> for T
where
    T: tower::Service<Request<Body>, Response = Response<ResponseBody>>,
    ResponseBody: http_body::Body,
{
    fn no_cache(self) -> MapResponse<T, fn(T::Response) -> T::Response> {
        ServiceExt::<Request<Body>>::map_response(self, with_no_cache_headers::<ResponseBody>)
    }
}

fn with_no_cache_headers<B>(mut response: Response<B>) -> Response<B> {
    insert_no_cache_headers(response.headers_mut());
    response
}

fn insert_no_cache_headers(headers: &mut HeaderMap) {
    for (name, value) in NO_CACHE_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}
