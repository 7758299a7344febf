use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;

use crate::errors::HaproxyCtlError;
use crate::infrastructure::haproxy_client::HaproxyClient;
use crate::model::action::{Action, ActionResult};
use crate::model::endpoint::Endpoint;
use crate::model::stat::StatRow;

pub const STATUS_HEADER: [&str; 7] = [
    "LoadBalancer",
    "Backend",
    "Server",
    "Status",
    "LastCheck",
    "Downtime",
    "Error",
];
pub const ACTION_HEADER: [&str; 4] = ["LoadBalancer", "Done", "All OK", "Error"];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatusRow {
    pub load_balancer: String,
    pub backend: String,
    pub server: String,
    pub status: String,
    pub last_check: String,
    pub downtime: String,
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActionRow {
    pub load_balancer: String,
    pub done: bool,
    pub all_ok: bool,
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Status(Vec<StatusRow>),
    Action(Vec<ActionRow>),
}

impl Report {
    pub fn header(&self) -> Vec<&'static str> {
        match self {
            Report::Status(_) => STATUS_HEADER.to_vec(),
            Report::Action(_) => ACTION_HEADER.to_vec(),
        }
    }

    /// Rows as display strings, in the column order of `header`
    pub fn cells(&self) -> Vec<Vec<String>> {
        match self {
            Report::Status(rows) => rows
                .iter()
                .map(|r| {
                    vec![
                        r.load_balancer.clone(),
                        r.backend.clone(),
                        r.server.clone(),
                        r.status.clone(),
                        r.last_check.clone(),
                        r.downtime.clone(),
                        r.error.clone(),
                    ]
                })
                .collect(),
            Report::Action(rows) => rows
                .iter()
                .map(|r| {
                    vec![
                        r.load_balancer.clone(),
                        r.done.to_string(),
                        r.all_ok.to_string(),
                        r.error.clone(),
                    ]
                })
                .collect(),
        }
    }
}

/// Queries every configured load balancer and gathers the answers into one report.
///
/// Load balancers are independent: each gets its own client and is asked exactly once per
/// report, so requests run concurrently while rows keep the configured order.
pub struct Orchestrator {
    clients: Vec<HaproxyClient>,
}

impl Orchestrator {
    pub fn build(endpoints: Vec<Endpoint>) -> Self {
        let clients = endpoints.into_iter().map(HaproxyClient::build).collect();
        Orchestrator { clients }
    }

    pub async fn status_report(&self) -> Report {
        let results = join_all(self.clients.iter().map(|client| client.get_stats())).await;

        let mut rows = Vec::new();
        for (client, result) in self.clients.iter().zip(results) {
            rows.extend(status_rows(client.endpoint(), result));
        }
        Report::Status(rows)
    }

    pub async fn action_report(&self, action: Action, backend: &str, servers: &[String]) -> Report {
        log::info!(
            "Sending {} for {:?} on backend {} to {} load balancers",
            action,
            servers,
            backend,
            self.clients.len()
        );
        let results = join_all(
            self.clients
                .iter()
                .map(|client| client.send_action(servers, backend, action)),
        )
        .await;

        let rows = self
            .clients
            .iter()
            .zip(results)
            .map(|(client, result)| action_row(client.endpoint(), result))
            .collect();
        Report::Action(rows)
    }
}

/// Projects the stats of one load balancer onto report rows, leaving out the FRONTEND/BACKEND
/// aggregates. A failed fetch becomes a single ERROR row.
fn status_rows(endpoint: &Endpoint, result: Result<Vec<StatRow>, HaproxyCtlError>) -> Vec<StatusRow> {
    match result {
        Ok(stats) => stats
            .iter()
            .filter(|stat| !stat.is_summary())
            .map(|stat| StatusRow {
                load_balancer: endpoint.name.clone(),
                backend: stat.proxy_name.clone(),
                server: stat.service_name.clone(),
                status: stat.status.clone(),
                last_check: stat.last_check.clone(),
                downtime: format_duration(stat.downtime),
                error: String::new(),
            })
            .collect(),
        Err(error) => {
            log::warn!("Could not get stats from {}: {}", endpoint.name, error);
            vec![StatusRow {
                load_balancer: endpoint.name.clone(),
                backend: String::new(),
                server: String::new(),
                status: String::from("ERROR"),
                last_check: String::new(),
                downtime: String::new(),
                error: error.to_string(),
            }]
        }
    }
}

fn action_row(endpoint: &Endpoint, result: ActionResult) -> ActionRow {
    if let Some(error) = &result.error {
        log::warn!("Action on {} not fully applied: {}", endpoint.name, error);
    }
    ActionRow {
        load_balancer: endpoint.name.clone(),
        done: result.done,
        all_ok: result.all_ok,
        error: result.error.map(|e| e.to_string()).unwrap_or_default(),
    }
}

/// Whole seconds as hours, minutes and seconds: `0s`, `2m5s`, `1h0m0s`
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hyper::StatusCode;

    use crate::errors::HaproxyCtlError;
    use crate::infrastructure::fake_haproxy::{unreachable_url, FakeHaproxy, Reply};
    use crate::model::action::{Action, ActionResult};
    use crate::model::endpoint::{Credentials, Endpoint};
    use crate::model::stat::decode_stats;
    use crate::model::stat::tests::SAMPLE_STATS;
    use crate::modules::report::{
        action_row, format_duration, status_rows, ActionRow, Orchestrator, Report, StatusRow,
    };

    fn endpoint(name: &str, url: &str) -> Endpoint {
        Endpoint::build(name, url, Credentials::default()).unwrap()
    }

    fn servers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn should_exclude_summary_rows_from_status_report() {
        // given:
        let stats = decode_stats(SAMPLE_STATS.as_bytes()).unwrap();
        let decoded = stats.len();

        // when:
        let rows = status_rows(&endpoint("lb1", "http://lb1/"), Ok(stats));

        // then:
        assert!(decoded >= rows.len());
        assert_eq!(
            rows,
            vec![
                StatusRow {
                    load_balancer: String::from("lb1"),
                    backend: String::from("prod-web"),
                    server: String::from("ny-web01"),
                    status: String::from("UP"),
                    last_check: String::from("Layer4 check passed"),
                    downtime: String::from("0s"),
                    error: String::new(),
                },
                StatusRow {
                    load_balancer: String::from("lb1"),
                    backend: String::from("prod-web"),
                    server: String::from("ny-web02"),
                    status: String::from("MAINT"),
                    last_check: String::from("Layer4 connection problem, info: \"Connection refused\""),
                    downtime: String::from("2m5s"),
                    error: String::new(),
                },
            ]
        );
    }

    #[test]
    fn should_mark_failed_endpoint_as_error_row() {
        // when:
        let rows = status_rows(
            &endpoint("lb1", "http://lb1/"),
            Err(HaproxyCtlError::HttpStatusError(StatusCode::FORBIDDEN)),
        );

        // then:
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, "ERROR");
        assert_eq!(rows[0].error, "status code 403");
        assert!(rows[0].backend.is_empty() && rows[0].server.is_empty());
    }

    #[test]
    fn should_blank_error_of_successful_action() {
        // when:
        let row = action_row(
            &endpoint("lb1", "http://lb1/"),
            ActionResult {
                done: true,
                all_ok: true,
                error: None,
            },
        );

        // then:
        assert_eq!(
            row,
            ActionRow {
                load_balancer: String::from("lb1"),
                done: true,
                all_ok: true,
                error: String::new(),
            }
        );
    }

    #[test]
    fn should_format_durations() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0s");
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m5s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h0m0s");
        assert_eq!(format_duration(Duration::from_secs(93784)), "26h3m4s");
    }

    #[tokio::test]
    async fn should_keep_going_when_one_endpoint_is_unreachable() {
        // given:
        let first = FakeHaproxy::start(Reply::stats(StatusCode::OK, SAMPLE_STATS)).await;
        let third = FakeHaproxy::start(Reply::stats(StatusCode::OK, SAMPLE_STATS)).await;
        let orchestrator = Orchestrator::build(vec![
            endpoint("lb1", first.url().as_str()),
            endpoint("lb2", unreachable_url().as_str()),
            endpoint("lb3", third.url().as_str()),
        ]);

        // when:
        let report = orchestrator.status_report().await;

        // then:
        let rows = match report {
            Report::Status(rows) => rows,
            other => panic!("unexpected report {:?}", other),
        };
        let groups: Vec<&str> = rows.iter().map(|r| r.load_balancer.as_str()).collect();
        assert_eq!(groups, vec!["lb1", "lb1", "lb2", "lb3", "lb3"]);
        assert_eq!(rows[2].status, "ERROR");
        assert!(!rows[2].error.is_empty());
        assert_eq!(rows[0].server, "ny-web01");
        assert_eq!(rows[4].server, "ny-web02");
    }

    #[tokio::test]
    async fn should_report_one_row_per_endpoint_for_actions() {
        // given:
        let done = FakeHaproxy::start(Reply::action(StatusCode::SEE_OTHER, Some("/haproxy;st=DONE"))).await;
        let partial = FakeHaproxy::start(Reply::action(StatusCode::SEE_OTHER, Some("/haproxy;st=PART"))).await;
        let orchestrator = Orchestrator::build(vec![
            endpoint("lb1", done.url().as_str()),
            endpoint("lb2", partial.url().as_str()),
            endpoint("lb3", unreachable_url().as_str()),
        ]);

        // when:
        let report = orchestrator
            .action_report(
                Action::SetStateToDrain,
                "prod-web",
                &servers(&["ny-web01", "ny-web02"]),
            )
            .await;

        // then:
        let rows = match report {
            Report::Action(rows) => rows,
            other => panic!("unexpected report {:?}", other),
        };
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].done, rows[0].all_ok, rows[0].error.as_str()), (true, true, ""));
        assert_eq!(
            (rows[1].done, rows[1].all_ok, rows[1].error.as_str()),
            (true, false, "partially applied")
        );
        assert_eq!((rows[2].done, rows[2].all_ok), (false, false));
        assert!(!rows[2].error.is_empty());
        assert_eq!(done.requests().len(), 1);
        assert_eq!(partial.requests()[0].body, "s=ny-web01&s=ny-web02&action=drain&b=prod-web");
    }

    #[test]
    fn should_render_cells_in_header_order() {
        // given:
        let report = Report::Action(vec![ActionRow {
            load_balancer: String::from("lb1"),
            done: true,
            all_ok: false,
            error: String::from("partially applied"),
        }]);

        // then:
        assert_eq!(report.header(), vec!["LoadBalancer", "Done", "All OK", "Error"]);
        assert_eq!(
            report.cells(),
            vec![vec!["lb1", "true", "false", "partially applied"]]
        );
    }
}
