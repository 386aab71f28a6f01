use bytes::{Bytes, BytesMut};
use http::{HeaderValue, StatusCode, header::CONTENT_TYPE};

use super::{IntoResponse, ResponsePayload};

use macros::res;

const UTF8: HeaderValue = HeaderValue::from_static("text/plain; charset=utf-8");
const OCTET_STREAM: HeaderValue = HeaderValue::from_static("application/octet-stream");

// ===== Implementations =====

res!(ResponsePayload, self => self);
res!(StatusCode, self => ResponsePayload::new(self, Bytes::new()));
res!(&'static str, self => text(Bytes::from_static(self.as_bytes())));
res!(String, self => text(Bytes::from(self)));
res!(&'static [u8], self => bytes(Bytes::from_static(self)));
res!(Vec<u8>, self => bytes(Bytes::from(self)));
res!(Bytes, self => bytes(self));
res!(BytesMut, self => bytes(self.freeze()));

impl<R: IntoResponse> IntoResponse for (StatusCode, R) {
    fn into_response(self) -> ResponsePayload {
        let mut res = self.1.into_response();
        res.status = self.0;
        res
    }
}

fn text(body: Bytes) -> ResponsePayload {
    ResponsePayload::new(StatusCode::OK, body).header(CONTENT_TYPE, UTF8)
}

fn bytes(body: Bytes) -> ResponsePayload {
    ResponsePayload::new(StatusCode::OK, body).header(CONTENT_TYPE, OCTET_STREAM)
}

// ===== Macros =====

mod macros {
    macro_rules! res {
        ($target:ty, $self:ident => $body:expr) => {
            impl IntoResponse for $target {
                fn into_response($self) -> ResponsePayload {
                    $body
                }
            }
        };
    }

    pub(crate) use res;
}
