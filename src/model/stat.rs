use std::convert::TryFrom;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::HaproxyCtlError;

/// Service names HAProxy uses for the aggregate lines of a proxy
pub const FRONTEND_SERVICE: &str = "FRONTEND";
pub const BACKEND_SERVICE: &str = "BACKEND";

/// Kind of entry a stats line describes
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EntryType {
    Frontend,
    Backend,
    Server,
    Socket,
}

impl Default for EntryType {
    fn default() -> Self {
        EntryType::Frontend
    }
}

impl TryFrom<u64> for EntryType {
    type Error = HaproxyCtlError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EntryType::Frontend),
            1 => Ok(EntryType::Backend),
            2 => Ok(EntryType::Server),
            3 => Ok(EntryType::Socket),
            _ => Err(HaproxyCtlError::decode(
                "entry type out of range",
                value.to_string().as_str(),
            )),
        }
    }
}

/// One line of the HAProxy stats CSV export
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatRow {
    pub proxy_name: String,
    pub service_name: String,
    pub queue_current: u64,
    pub queue_max: u64,
    pub sessions_current: u64,
    pub sessions_max: u64,
    pub session_limit: u64,
    pub sessions_total: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub denied_requests: u64,
    pub denied_responses: u64,
    pub errors_requests: u64,
    pub errors_connections: u64,
    pub errors_responses: u64,
    pub warnings_retries: u64,
    pub warnings_redispatches: u64,
    pub status: String,
    pub weight: u64,
    pub active: u64,
    pub backup: u64,
    pub check_failed: u64,
    pub check_downed: u64,
    pub status_last_changed: Duration,
    pub downtime: Duration,
    pub queue_limit: u64,
    pub process_id: u64,
    pub proxy_id: u64,
    pub service_id: u64,
    pub throttle: u64,
    pub lb_total: u64,
    pub tracked: u64,
    pub entry_type: EntryType,
    pub rate: u64,
    pub rate_limit: u64,
    pub rate_max: u64,
    pub check_status: String,
    pub check_code: String,
    pub check_duration: u64,
    pub http_responses_1xx: u64,
    pub http_responses_2xx: u64,
    pub http_responses_3xx: u64,
    pub http_responses_4xx: u64,
    pub http_responses_5xx: u64,
    pub http_responses_other: u64,
    pub check_failed_details: u64,
    pub request_rate: u64,
    pub request_rate_max: u64,
    pub requests_total: u64,
    pub aborted_by_client: u64,
    pub aborted_by_server: u64,
    pub compressed_bytes_in: u64,
    pub compressed_bytes_out: u64,
    pub compressed_bytes_bypassed: u64,
    pub compressed_responses: u64,
    pub last_session: Duration,
    pub last_check: String,
    pub last_agent_check: String,
    pub avg_queue_time: u64,
    pub avg_connect_time: u64,
    pub avg_response_time: u64,
    pub avg_total_time: u64,
}

impl StatRow {
    /// Returns `true` for the FRONTEND/BACKEND aggregate lines of a proxy
    pub fn is_summary(&self) -> bool {
        self.service_name == FRONTEND_SERVICE || self.service_name == BACKEND_SERVICE
    }

    fn set_column(&mut self, column: &str, value: &str) -> Result<(), HaproxyCtlError> {
        match column {
            "pxname" => self.proxy_name = value.to_string(),
            "svname" => self.service_name = value.to_string(),
            "qcur" => self.queue_current = parse_counter(column, value)?,
            "qmax" => self.queue_max = parse_counter(column, value)?,
            "scur" => self.sessions_current = parse_counter(column, value)?,
            "smax" => self.sessions_max = parse_counter(column, value)?,
            "slim" => self.session_limit = parse_counter(column, value)?,
            "stot" => self.sessions_total = parse_counter(column, value)?,
            "bin" => self.bytes_in = parse_counter(column, value)?,
            "bout" => self.bytes_out = parse_counter(column, value)?,
            "dreq" => self.denied_requests = parse_counter(column, value)?,
            "dresp" => self.denied_responses = parse_counter(column, value)?,
            "ereq" => self.errors_requests = parse_counter(column, value)?,
            "econ" => self.errors_connections = parse_counter(column, value)?,
            "eresp" => self.errors_responses = parse_counter(column, value)?,
            "wretr" => self.warnings_retries = parse_counter(column, value)?,
            "wredis" => self.warnings_redispatches = parse_counter(column, value)?,
            "status" => self.status = value.to_string(),
            "weight" => self.weight = parse_counter(column, value)?,
            "act" => self.active = parse_counter(column, value)?,
            "bck" => self.backup = parse_counter(column, value)?,
            "chkfail" => self.check_failed = parse_counter(column, value)?,
            "chkdown" => self.check_downed = parse_counter(column, value)?,
            "lastchg" => self.status_last_changed = parse_seconds(column, value)?,
            "downtime" => self.downtime = parse_seconds(column, value)?,
            "qlimit" => self.queue_limit = parse_counter(column, value)?,
            "pid" => self.process_id = parse_counter(column, value)?,
            "iid" => self.proxy_id = parse_counter(column, value)?,
            "sid" => self.service_id = parse_counter(column, value)?,
            "throttle" => self.throttle = parse_counter(column, value)?,
            "lbtot" => self.lb_total = parse_counter(column, value)?,
            "tracked" => self.tracked = parse_counter(column, value)?,
            "type" => self.entry_type = EntryType::try_from(parse_counter(column, value)?)?,
            "rate" => self.rate = parse_counter(column, value)?,
            "rate_lim" => self.rate_limit = parse_counter(column, value)?,
            "rate_max" => self.rate_max = parse_counter(column, value)?,
            "check_status" => self.check_status = value.to_string(),
            "check_code" => self.check_code = value.to_string(),
            "check_duration" => self.check_duration = parse_counter(column, value)?,
            "hrsp_1xx" => self.http_responses_1xx = parse_counter(column, value)?,
            "hrsp_2xx" => self.http_responses_2xx = parse_counter(column, value)?,
            "hrsp_3xx" => self.http_responses_3xx = parse_counter(column, value)?,
            "hrsp_4xx" => self.http_responses_4xx = parse_counter(column, value)?,
            "hrsp_5xx" => self.http_responses_5xx = parse_counter(column, value)?,
            "hrsp_other" => self.http_responses_other = parse_counter(column, value)?,
            "hanafail" => self.check_failed_details = parse_counter(column, value)?,
            "req_rate" => self.request_rate = parse_counter(column, value)?,
            "req_rate_max" => self.request_rate_max = parse_counter(column, value)?,
            "req_tot" => self.requests_total = parse_counter(column, value)?,
            "cli_abrt" => self.aborted_by_client = parse_counter(column, value)?,
            "srv_abrt" => self.aborted_by_server = parse_counter(column, value)?,
            "comp_in" => self.compressed_bytes_in = parse_counter(column, value)?,
            "comp_out" => self.compressed_bytes_out = parse_counter(column, value)?,
            "comp_byp" => self.compressed_bytes_bypassed = parse_counter(column, value)?,
            "comp_rsp" => self.compressed_responses = parse_counter(column, value)?,
            "lastsess" => self.last_session = parse_seconds(column, value)?,
            "last_chk" => self.last_check = value.to_string(),
            "last_agt" => self.last_agent_check = value.to_string(),
            "qtime" => self.avg_queue_time = parse_counter(column, value)?,
            "ctime" => self.avg_connect_time = parse_counter(column, value)?,
            "rtime" => self.avg_response_time = parse_counter(column, value)?,
            "ttime" => self.avg_total_time = parse_counter(column, value)?,
            // newer HAProxy versions keep appending columns
            _ => {}
        }
        Ok(())
    }
}

/// Decodes the body of `GET /haproxy;csv` into one `StatRow` per data line.
///
/// Columns are matched by the names in the header line, so unknown columns are skipped and
/// missing ones keep their zero value.
pub fn decode_stats(raw: &[u8]) -> Result<Vec<StatRow>, HaproxyCtlError> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| HaproxyCtlError::decode("not valid utf-8", &String::from_utf8_lossy(raw)))?;

    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| HaproxyCtlError::decode("missing header line", text))?;
    let columns = parse_header(header_line)?;

    let mut result = Vec::new();
    for line in lines {
        let values = split_record(line)?;
        if values.len() != columns.len() {
            return Err(HaproxyCtlError::decode(
                format!("expected {} columns, found {}", columns.len(), values.len()).as_str(),
                line,
            ));
        }

        let mut row = StatRow::default();
        for (column, value) in columns.iter().zip(values.iter()) {
            row.set_column(column, value)?;
        }
        result.push(row);
    }

    log::debug!("Decoded {} stats rows", result.len());
    Ok(result)
}

fn parse_header(line: &str) -> Result<Vec<String>, HaproxyCtlError> {
    let mut columns = split_record(line)?;
    match columns.first_mut() {
        Some(first) => {
            // HAProxy marks the header as a comment: "# pxname,svname,..."
            let name = first
                .as_str()
                .strip_prefix('#')
                .unwrap_or(first.as_str())
                .trim_start()
                .to_string();
            if name.is_empty() {
                return Err(HaproxyCtlError::decode("unparseable header", line));
            }
            *first = name;
        }
        None => return Err(HaproxyCtlError::decode("unparseable header", line)),
    }
    Ok(columns)
}

/// Splits one CSV line into its fields. Fields can be double-quoted; `""` inside a quoted field
/// is a literal quote.
fn split_record(line: &str) -> Result<Vec<String>, HaproxyCtlError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ('"', false) if current.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut current)),
            (c, _) => current.push(c),
        }
    }

    if in_quotes {
        return Err(HaproxyCtlError::decode("unterminated quoted field", line));
    }
    fields.push(current);
    Ok(fields)
}

fn parse_counter(column: &str, value: &str) -> Result<u64, HaproxyCtlError> {
    if value.is_empty() {
        return Ok(0);
    }
    u64::from_str(value).map_err(|_| {
        HaproxyCtlError::decode(format!("non-numeric value in column {}", column).as_str(), value)
    })
}

fn parse_seconds(column: &str, value: &str) -> Result<Duration, HaproxyCtlError> {
    parse_counter(column, value).map(Duration::from_secs)
}
