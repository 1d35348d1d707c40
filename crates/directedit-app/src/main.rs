//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    use directedit_app::cli::{self, CliArgs, ENABLE_VAR, USAGE};
    use directedit_app::{ShortcutRegistry, SystemClipboard};
    use directedit_core::{FilePrefs, MemoryPrefs};

    env_logger::init();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    let env = std::env::var(ENABLE_VAR).ok();
    let config = match cli::load_config(&args, env.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if args.help {
        println!("{}", USAGE);
        ShortcutRegistry::print_all(&config);
        return;
    }

    log::info!("Starting Direct Edit on {}", args.fixture.display());
    let result = match FilePrefs::default_location() {
        Ok(prefs) => cli::run(&args, config, prefs, SystemClipboard::new()),
        Err(e) => {
            log::warn!("Panel preferences will not persist: {}", e);
            cli::run(&args, config, MemoryPrefs::new(), SystemClipboard::new())
        }
    };
    match result {
        Ok(out) => println!("{}", out),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
