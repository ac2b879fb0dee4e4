use clap::{ArgGroup, Parser};
use env_logger::Env;

use hci_host::config::{DEFAULT_HOST, DEFAULT_PORT};
use hci_host::{Config, Host, Role};

/// Run a BLE advertiser or scanner against a remote HCI controller.
#[derive(Parser, Debug)]
#[clap(group(ArgGroup::new("role").required(true).args(&["adv", "adv2", "scan"])))]
struct Args {
    /// Host name of the controller's HCI bridge
    #[clap(default_value = DEFAULT_HOST)]
    host: String,

    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Advertise from the public address
    #[clap(long)]
    adv: bool,

    /// Advertise from a random address for a limited time
    #[clap(long)]
    adv2: bool,

    /// Scan, alternating between passive and active
    #[clap(long)]
    scan: bool,

    /// Connect to each device found at the end of a scan cycle
    #[clap(long)]
    connect: bool,
}

impl Args {
    fn role(&self) -> Role {
        if self.adv {
            Role::Advertiser
        } else if self.adv2 {
            Role::AlternateAdvertiser
        } else {
            Role::Scanner
        }
    }
}

pub fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config {
        host: args.host.clone(),
        port: args.port,
        role: args.role(),
        connect_after_scan: args.connect,
    };

    let mut host = Host::connect(&config)?;
    host.start();
    host.run()?;

    Ok(())
}
