use std::env;
use std::time::Duration;

use tech_emodul::{Host, Platform, PlatformAccessory, PlatformConfig, Temperature};

struct PrintHost;

impl Host for PrintHost {
    fn register_accessories(&self, accessories: &[PlatformAccessory]) {
        for accessory in accessories {
            println!("+ {} ({})", accessory.display_name, accessory.uuid);
        }
    }

    fn update_accessories(&self, accessories: &[PlatformAccessory]) {
        for accessory in accessories {
            println!("~ {} ({})", accessory.display_name, accessory.uuid);
        }
    }
}

#[tokio::main]
async fn main() -> tech_emodul::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let (login, password) = match (args.get(1), args.get(2)) {
        (Some(login), Some(password)) => (login.clone(), password.clone()),
        _ => {
            eprintln!("usage: monitor <login> <password> [api-url]");
            std::process::exit(2);
        }
    };

    let mut config = PlatformConfig::new(login, password);
    config.api_url = args.get(3).cloned();

    let mut platform = Platform::new(config, PrintHost)?;
    println!("Connecting to {}...", platform.client().base_url());
    platform.launch().await;
    if !platform.client().is_authenticated() {
        eprintln!("Login failed");
        std::process::exit(1);
    }
    println!("Discovered {} zones. Polling for updates...", platform.adapters().len());

    loop {
        tokio::time::sleep(Duration::from_secs(5)).await;
        for zone in platform.adapters() {
            let current = Temperature::from_celsius(zone.current_temperature());
            println!(
                "[{}] {:.1}\u{00b0}C / {:.1}\u{00b0}F | target {:.1}\u{00b0}C | {:?}",
                zone.name(),
                current.celsius(),
                current.fahrenheit(),
                zone.target_temperature(),
                zone.current_heating_cooling_state(),
            );
        }
    }
}
