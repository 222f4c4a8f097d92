use minijinja::{Environment, UndefinedBehavior};

/// Builds the template environment used for module rendering: chainable
/// undefined lookups (missing context keys render empty instead of
/// failing) plus the custom filter set below. minijinja ships the rest of
/// the commonly used filters (`first`, `last`, `join`, `upper`, `lower`,
/// `trim`, `default`, `unique`) out of the box.
pub fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Chainable);
    env.add_filter("lines", lines);
    env.add_filter("compact", compact);
    env.add_filter("net_host", net_host);
    env.add_filter("net_port", net_port);
    env.add_filter("read_file", read_file);
    env.add_filter("strval", strval);

    env
}

/// Joins the given sequence using a newline as delimiter.
fn lines(values: Vec<String>) -> String {
    values.join("\n")
}

/// Removes empty entries from the given sequence.
fn compact(values: Vec<String>) -> Vec<String> {
    values.into_iter().filter(|v| !v.is_empty()).collect()
}

fn split_host_port(hostport: &str) -> Option<(&str, &str)> {
    if let Some(rest) = hostport.strip_prefix('[') {
        // bracketed IPv6 notation, optionally followed by :port
        let (host, rest) = rest.split_once(']')?;
        if rest.is_empty() {
            return Some((host, ""));
        }
        return Some((host, rest.strip_prefix(':')?));
    }

    match hostport.matches(':').count() {
        0 => Some((hostport, "")),
        1 => hostport.split_once(':'),
        // bare IPv6 is ambiguous without brackets
        _ => None,
    }
}

/// The host part of a `host:port` value. Any error is discarded and an
/// empty string is returned instead.
fn net_host(hostport: String) -> String {
    split_host_port(&hostport)
        .map(|(host, _)| host.to_string())
        .unwrap_or_default()
}

/// The numeric port part of a `host:port` value. Any error is discarded
/// and zero is returned instead.
fn net_port(hostport: String) -> i64 {
    split_host_port(&hostport)
        .and_then(|(_, port)| port.parse().ok())
        .unwrap_or_default()
}

/// The content of the given file. Any error is discarded and an empty
/// string is returned instead.
fn read_file(path: String) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

/// The rendered string form of an arbitrary template value.
fn strval(value: minijinja::Value) -> String {
    value.to_string()
}
