use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cfg = passkey_verify::config::Config::parse();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(passkey_verify::run(cfg))
}
