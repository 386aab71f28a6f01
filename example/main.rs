use switchyard::{Handler, HandlerRegistry, RequestContext, StartError, handler::command};

fn start(_: &RequestContext) -> &'static str {
    "Hello World"
}

fn upload(ctx: &RequestContext) -> String {
    println!("> {} {}", ctx.method(), ctx.path());
    format!("You've sent: {}", ctx.body().as_str().unwrap_or_default())
}

fn main() -> Result<(), StartError> {
    env_logger::init();

    let registry = HandlerRegistry::builder()
        .route("/", Handler::sync(start))
        .route("/start", Handler::sync(start))
        .route("/upload", Handler::sync(upload))
        .route("/ls", command("ls", ["-lah"]))
        .build()
        .expect("handler paths are unique");

    switchyard::start(registry, 8888)
}
