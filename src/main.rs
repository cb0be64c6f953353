// Entry point and menu-driven CLI flow.
//
// - Option [1] imports DMA zones from CSV and prints diagnostics.
// - Option [2] analyses the zones and writes the priority/comparison
//   reports plus a JSON summary.
// - Option [3] validates and calculates the utility-level balance from a
//   JSON input file.
// - Option [4] prints the CSV template.
use log::{error, info, warn};
use nrw_balance::config::AppConfig;
use nrw_balance::draft::Draft;
use nrw_balance::{loader, output, reports, util};
use nrw_balance::{BalanceInput, CalculationContext, Evaluation, Mode};
use std::io::{self, BufRead, Write};

// Session state lives here and is passed down explicitly.
struct App {
    config: AppConfig,
    ctx: CalculationContext,
}

impl App {
    fn save_draft(&self) {
        if let Err(e) = Draft::capture(&self.ctx).save(&self.config.draft_path) {
            warn!("could not save draft: {}", e);
        }
    }
}

/// Read one trimmed line; `None` once the input is closed.
fn read_line(input: &mut impl BufRead) -> Option<String> {
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice(input: &mut impl BufRead) -> Option<String> {
    print!("Enter choice: ");
    read_line(input)
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N` or
/// the input is closed.
fn prompt_back_to_menu(input: &mut impl BufRead) -> bool {
    loop {
        print!("Back to Menu (Y/N): ");
        let Some(answer) = read_line(input) else {
            return false;
        };
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: import zones from the configured CSV file.
fn handle_load(app: &mut App) {
    let path = app.config.zones_csv.clone();
    let report = match loader::load_zones_csv(&path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", path.display(), e);
            return;
        }
    };

    for w in &report.warnings {
        println!("Warning: {}", w);
    }
    for e in &report.errors {
        println!("Error: {}", e);
    }
    if !report.success {
        println!();
        return;
    }
    println!(
        "Imported {} zones from {}\n",
        util::format_int(report.zones.len()),
        path.display()
    );
    app.ctx.replace_zones(report.zones);
    app.save_draft();
}

/// Handle option [2]: analyse all zones and write the reports.
fn handle_zone_reports(app: &mut App) {
    app.ctx.mode = Mode::Zones;
    let (analysis, priorities, zone_issues) = match app.ctx.evaluate() {
        Ok(Evaluation::Zones {
            analysis,
            priorities,
            zone_issues,
        }) => (analysis, priorities, zone_issues),
        Ok(_) => return,
        Err(e) => {
            println!("Error: {}\n", e);
            return;
        }
    };

    for (id, issues) in &zone_issues {
        for issue in issues {
            println!("Warning: zone {}: {}", id, issue);
        }
    }

    println!("Generating reports...\n");
    let cfg = &app.config;
    let preview = cfg.preview_rows;

    let agg = &analysis.pdam_aggregate;
    println!(
        "NRW Level PDAM (Agregat): {}% ({} m³/thn dari {} zona)\n",
        util::format_number(agg.percentages.nrw, 1),
        util::format_number(agg.components.nrw, 0),
        analysis.zone_count
    );

    let r1 = reports::priority_rows(&priorities);
    let file1 = cfg.output_path("report1_priority_zones.csv");
    if let Err(e) = output::write_csv(&file1, &r1) {
        error!("write error: {}", e);
    }
    println!("Report 1: Zona Prioritas Intervensi\n");
    output::preview_table_rows(&r1, preview);
    println!("(Full table exported to {})\n", file1.display());

    let r2 = reports::zone_comparison_rows(&analysis);
    let file2 = cfg.output_path("report2_zone_comparison.csv");
    if let Err(e) = output::write_csv(&file2, &r2) {
        error!("write error: {}", e);
    }
    println!("Report 2: Perbandingan Semua Zona\n");
    output::preview_table_rows(&r2, preview);
    println!("(Full table exported to {})\n", file2.display());

    let summary = reports::generate_zone_summary(&analysis, &priorities);
    let file3 = cfg.output_path("summary.json");
    if let Err(e) = output::write_json(&file3, &summary) {
        error!("write error: {}", e);
    }
    println!("Summary saved to {}\n", file3.display());
    app.save_draft();
}

/// Handle option [3]: validate, then calculate the utility-level balance.
fn handle_utility(app: &mut App) {
    let path = app.config.utility_input.clone();
    let input: BalanceInput = match std::fs::read_to_string(&path)
        .map_err(nrw_balance::Error::from)
        .and_then(|s| serde_json::from_str(&s).map_err(nrw_balance::Error::from))
    {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Failed to read {}: {}\n", path.display(), e);
            return;
        }
    };
    app.ctx.mode = Mode::Utility;
    app.ctx.utility = input;

    match app.ctx.evaluate() {
        Ok(Evaluation::Rejected(report)) => {
            println!("Terjadi kesalahan:\n");
            for m in report.error_messages() {
                println!("- {}", m);
            }
            println!();
        }
        Ok(Evaluation::Utility { report, result }) => {
            for m in report.warning_messages() {
                println!("Warning: {}", m);
            }
            for w in &result.validation.warnings {
                println!("{:?}: {}", w.level, w.message);
            }
            println!();
            let rows = reports::utility_kpi_rows(&result);
            output::preview_table_rows(&rows, rows.len());
            let file = app.config.output_path("utility_result.json");
            if let Err(e) = output::write_json(&file, &result) {
                error!("write error: {}", e);
            }
            println!("(Full result exported to {})\n", file.display());
            app.save_draft();
        }
        Ok(Evaluation::Zones { .. }) => {}
        Err(e) => println!("Error: {}\n", e),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    let ctx = match Draft::load(&config.draft_path) {
        Ok(Some(draft)) => {
            info!("draft loaded ({:?} mode, {})", draft.mode, draft.timestamp);
            draft.restore()
        }
        Ok(None) => CalculationContext::default(),
        Err(e) => {
            warn!("failed to load draft: {}", e);
            CalculationContext::default()
        }
    };
    let mut app = App { config, ctx };
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        println!("Water Balance Calculator (IWA)");
        println!("[1] Load zones CSV");
        println!("[2] Generate zone reports");
        println!("[3] Calculate utility balance");
        println!("[4] Show CSV template\n");
        let Some(choice) = read_choice(&mut input) else {
            println!("\nExiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&mut app),
            "2" => {
                println!();
                handle_zone_reports(&mut app);
                if !prompt_back_to_menu(&mut input) {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                println!();
                handle_utility(&mut app);
                if !prompt_back_to_menu(&mut input) {
                    println!("Exiting the program.");
                    break;
                }
            }
            "4" => println!("\n{}", loader::csv_template()),
            _ => println!("Invalid choice. Please enter 1-4.\n"),
        }
    }
}
