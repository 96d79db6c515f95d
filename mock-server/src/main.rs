use tokio::net::TcpListener;
use webinar_mock_server::ROUTES;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;

    println!("mock webinar backend listening on http://{addr}");
    for (method, path) in ROUTES {
        println!("  {method:<4} {path}");
    }
    println!(
        "seeded accounts: {} (admin), {}",
        webinar_mock_server::ADMIN_EMAIL,
        webinar_mock_server::USER_EMAIL
    );

    webinar_mock_server::run(listener).await
}
