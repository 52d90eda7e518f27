use clap::Parser;
use idxcache::config::Config;
use idxcache::{server, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();

    server::run(config).await
}
