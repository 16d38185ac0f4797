//! Host simulator for rtboot
//!
//! Boots one of the shipped board presets on the host HAL. The initial task
//! runs its payload and then idles until the process is killed.
//!
//! Environment:
//! - `RTB_BOARD` - preset name (`stm32f4`, `generic-posix`); default `stm32f4`
//! - `RTB_DUMP_CONFIG` - when set, print the budget as JSON and as
//!   configuration constants, then exit

use rtb_config::{configuration_constants, presets, ResourceBudget};
use rtb_hal::HostHal;
use rtb_init::{boot, greeting, noop};

const DEFAULT_BOARD: &str = "stm32f4";

fn main() {
    let board = std::env::var("RTB_BOARD").unwrap_or_else(|_| DEFAULT_BOARD.to_string());

    let Some(budget) = presets::by_name(&board) else {
        eprintln!("[rtb-sim] unknown board '{}'", board);
        eprintln!("[rtb-sim] available boards: stm32f4, generic-posix");
        std::process::exit(2);
    };

    if std::env::var_os("RTB_DUMP_CONFIG").is_some() {
        if let Err(e) = dump(budget) {
            eprintln!("[rtb-sim] failed to render budget: {}", e);
            std::process::exit(1);
        }
        return;
    }

    println!("╔═══════════════════════════════════════════════════╗");
    println!("║                rtboot host simulator              ║");
    println!("╠═══════════════════════════════════════════════════╣");
    println!("║  Board: {:<42}║", board);
    println!("║  Press Ctrl+C to stop                             ║");
    println!("╚═══════════════════════════════════════════════════╝");
    println!();

    let hal = HostHal::new();
    if budget.requires_posix_entry_point() {
        boot(budget, hal, noop())
    } else {
        boot(budget, hal, greeting("Hello from rtboot\n"))
    }
}

fn dump(budget: &ResourceBudget) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(budget)?);
    println!();
    for constant in configuration_constants(budget) {
        println!("{}", constant);
    }
    Ok(())
}
