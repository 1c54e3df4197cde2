use blog_api::configuration::get_configuration;
use blog_api::startup::Application;
use blog_api::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("blog-api".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().expect("Failed to read configuration.");
    // A failed bootstrap (e.g. exhausted database connection retries) bubbles
    // up through `anyhow` and terminates the process with a non-zero status.
    let application = Application::build(configuration).await?;
    application.run_until_stopped().await?;
    Ok(())
}
