use super::{format_seconds, open_sink, resolve_reference};
use crate::config::Config;
use crate::error::Result;
use crate::timer::TrainingProtocol;
use colored::Colorize;
use prettytable::{format, Table};

/// Build the preview table: one row per round
pub fn protocol_table(protocol: &TrainingProtocol, hold_target: u32) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "Round".bold(),
        "Rest".bold(),
        "Hold".bold(),
        "Elapsed".bold()
    ]);

    let mut elapsed = 0;
    for (index, rest) in protocol.rest_schedule().into_iter().enumerate() {
        elapsed += rest + hold_target;
        table.add_row(prettytable::row![
            index + 1,
            format_seconds(rest),
            format_seconds(hold_target),
            format_seconds(elapsed)
        ]);
    }

    table
}

/// Preview the training table the configured owner would run
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `reference` - Reference max hold; defaults to the best recorded baseline
pub fn show_protocol(config: &Config, reference: Option<u32>) -> Result<()> {
    let protocol = TrainingProtocol::from_config(&config.training)?;
    let reference = match reference {
        Some(_) => reference,
        None => resolve_reference(None, &open_sink(config)?),
    };
    let hold_target = protocol.hold_target(reference);

    let source = match reference.filter(|r| *r > 0) {
        Some(r) => format!(
            "{}% of {}",
            (protocol.hold_fraction() * 100.0).round(),
            format_seconds(r)
        ),
        None => format!(
            "default reference {}",
            format_seconds(protocol.default_reference_hold())
        ),
    };

    println!(
        "\n{} hold {} ({}), {} rounds",
        "CO2 table:".bold(),
        format_seconds(hold_target).cyan(),
        source,
        protocol.total_rounds()
    );
    protocol_table(&protocol, hold_target).printstd();
    println!(
        "Total: {}\n",
        format_seconds(protocol.estimated_duration(hold_target).as_secs() as u32)
    );

    Ok(())
}
