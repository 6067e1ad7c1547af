//! Fetch a bearer token from an OAuth2 token endpoint, the same way the
//! OAUTHBEARER mechanism does before each authentication attempt. Handy
//! when wiring up a new authorization server:
//!
//! ```console
//! $ OAUTH_CLIENT_ID=svc OAUTH_CLIENT_SECRET=... \
//!   OAUTH_SERVER_URL=https://auth.example.com \
//!   cargo run --example fetch_token
//! ```
//!
//! `OAUTH_TOKEN_URL` overrides the default `/oauth2/token` path.

use std::env;
use std::process;

use broker_sasl::{OauthBearerConfig, TokenClient};

fn main() {
    tracing_subscriber::fmt::init();

    let config = OauthBearerConfig {
        client_id: env::var("OAUTH_CLIENT_ID").ok(),
        client_secret: env::var("OAUTH_CLIENT_SECRET").ok(),
        server_url: env::var("OAUTH_SERVER_URL").ok(),
        token_url: env::var("OAUTH_TOKEN_URL").ok(),
    };

    let client = match TokenClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("set OAUTH_CLIENT_ID, OAUTH_CLIENT_SECRET and OAUTH_SERVER_URL");
            process::exit(2);
        }
    };

    println!("token endpoint: {}", client.token_endpoint());
    match client.fetch_token() {
        Ok(token) => println!("access token: {}", token.as_str()),
        Err(e) => {
            eprintln!("token request failed: {}", e);
            process::exit(1);
        }
    }
}
