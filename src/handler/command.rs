use http::StatusCode;
use std::sync::Arc;
use tokio::process::Command;

use super::Handler;
use crate::{error::BoxError, log, response::ResponsePayload};

/// Deferred handler that runs an external program and responds with its stdout.
///
/// The program runs without blocking the event loop. A non zero exit status is reported as a
/// handler failure.
///
/// ```no_run
/// use switchyard::handler::command;
///
/// let handler = command("ls", ["-lah"]);
/// ```
pub fn command<I, S>(program: impl Into<String>, args: I) -> Handler
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let program: Arc<str> = program.into().into();
    let args: Arc<[String]> = args.into_iter().map(Into::into).collect();

    Handler::future(move |_| run(Arc::clone(&program), Arc::clone(&args)))
}

async fn run(program: Arc<str>, args: Arc<[String]>) -> Result<ResponsePayload, BoxError> {
    log::debug!("running `{program}` with {args:?}");

    let output = Command::new(&*program).args(args.iter()).output().await?;

    if !output.status.success() {
        return Err(format!("`{program}` exited with {}", output.status).into());
    }

    Ok(ResponsePayload::text(StatusCode::OK, output.stdout))
}

#[cfg(all(test, unix))]
mod test {
    use super::*;
    use crate::handler::Completion;
    use crate::request::RequestContext;
    use http::{HeaderMap, Method};

    async fn call(handler: Handler) -> Result<ResponsePayload, BoxError> {
        let Handler::Deferred(f) = handler else { panic!("expected deferred handler") };
        let (completion, rx) = Completion::channel();
        let ctx = RequestContext::new(Method::GET, "/", HeaderMap::new());
        f.call(Arc::new(ctx), completion);
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn stdout_as_body() {
        let res = call(command("echo", ["Hello", "World"])).await.unwrap();
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.headers["content-type"], "text/plain");
        assert_eq!(res.body, "Hello World\n");
    }

    #[tokio::test]
    async fn failing_program() {
        assert!(call(command("false", Vec::<String>::new())).await.is_err());
        assert!(call(command("/nonexistent/program", ["x"])).await.is_err());
    }
}
