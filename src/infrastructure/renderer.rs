use std::io::Write;

use clap::ValueEnum;
use comfy_table::{ContentArrangement, Table};

use crate::errors::HaproxyCtlError;
use crate::modules::report::Report;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

pub fn render<W: Write>(report: &Report, format: OutputFormat, out: &mut W) -> Result<(), HaproxyCtlError> {
    match format {
        OutputFormat::Table => render_table(report.header().as_slice(), report.cells().as_slice(), out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// `+`/`-`/`|` borders, a line under the header and none between rows
const TABLE_PRESET: &str = "||--+-++|    ++++++";

/// Bordered text table with upper-cased headers
fn render_table<W: Write>(header: &[&str], rows: &[Vec<String>], out: &mut W) -> std::io::Result<()> {
    let mut table = Table::new();
    table
        .load_preset(TABLE_PRESET)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(header.iter().map(|h| h.to_uppercase()));
    for row in rows {
        table.add_row(row.iter());
    }

    writeln!(out, "{}", table)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use crate::infrastructure::renderer::{render, OutputFormat};
    use crate::modules::report::{ActionRow, Report};

    fn sample_report() -> Report {
        Report::Action(vec![
            ActionRow {
                load_balancer: String::from("ny-lb01"),
                done: true,
                all_ok: true,
                error: String::new(),
            },
            ActionRow {
                load_balancer: String::from("lb2"),
                done: true,
                all_ok: false,
                error: String::from("partially applied"),
            },
        ])
    }

    #[test]
    fn should_render_table() {
        // given:
        let mut out = Vec::new();

        // when:
        render(&sample_report(), OutputFormat::Table, &mut out).unwrap();

        // then:
        let expected = "\
+--------------+------+--------+-------------------+
| LOADBALANCER | DONE | ALL OK | ERROR             |
+--------------+------+--------+-------------------+
| ny-lb01      | true | true   |                   |
| lb2          | true | false  | partially applied |
+--------------+------+--------+-------------------+
";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn should_render_json() {
        // given:
        let mut out = Vec::new();

        // when:
        render(&sample_report(), OutputFormat::Json, &mut out).unwrap();

        // then:
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[1]["load_balancer"], "lb2");
        assert_eq!(value[1]["all_ok"], false);
        assert_eq!(value[0]["error"], "");
    }
}
