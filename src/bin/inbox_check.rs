use ticktick::{ClientConfig, Credentials, TickTick, Task};

fn print_tasks(tasks: &[Task]) {
    for task in tasks {
        let when = task
            .start_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let list = task.list_title().unwrap_or("?");
        println!("    [{}] {} {}", list, task.title, when);
    }
}

#[tokio::main]
async fn main() {
    systemd_journal_logger::JournalLog::new()
        .unwrap()
        .with_syslog_identifier("ticktick-inbox-check".to_string())
        .install()
        .unwrap();
    log::set_max_level(log::LevelFilter::Info);

    let config = match ClientConfig::load() {
        Ok(c) => c,
        Err(e) => { println!("Config error: {}", e); return; }
    };

    println!("=== TickTick inbox check ===\n");

    let account = config.api_url.clone();
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--forget") {
        match ticktick::sync::keyring::delete_credentials(&account).await {
            Ok(()) => println!("Removed stored credentials for {}", account),
            Err(e) => println!("Keyring error: {}", e),
        }
        return;
    }

    let from_env = Credentials::from_env();
    let remember = from_env.clone();
    let credentials = match from_env {
        Some(c) => c,
        None => match ticktick::sync::keyring::load_credentials(&account).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                println!("No credentials: set TICK_USER/TICK_PASS or store them in the keyring");
                return;
            }
            Err(e) => { println!("Keyring error: {}", e); return; }
        },
    };

    let mut client = match TickTick::with_config(credentials, config) {
        Ok(c) => c,
        Err(e) => { println!("Client error: {}", e); return; }
    };

    if let Err(e) = client.login().await {
        println!("Login failed: {}", e);
        return;
    }

    // Credentials from the environment worked, so later runs can use the keyring.
    if let Some(creds) = remember {
        if let Err(e) = ticktick::sync::keyring::store_credentials(&account, &creds).await {
            println!("Could not store credentials: {}", e);
        }
    }

    let state = client.state();
    match state.inbox() {
        Some(inbox) => println!("Inbox list: {} ({})", inbox.title, inbox.id),
        None => println!("Inbox list: not found"),
    }
    println!(
        "Lists: {}, active tasks: {}, completed: {}\n",
        state.lists.len(),
        state.tasks().len(),
        state.completed().len()
    );

    let inbox = client.query_inbox();
    println!("  Inbox ({}):", inbox.len());
    print_tasks(&inbox);

    let today = client.query_today();
    println!("\n  Today ({}):", today.len());
    print_tasks(&today);

    println!("\n=== Done ===");
}
