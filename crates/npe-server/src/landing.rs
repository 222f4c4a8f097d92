/// The landing page served on `/`: a short description, a probe form, and
/// a link to the telemetry endpoint.
pub fn page() -> String {
    format!(
        r#"<html>
<head><title>Nagios Plugin Exporter</title></head>
<body>
<h1>Nagios Plugin Exporter</h1>
<p>Prometheus Exporter for Nagios Plugins (version {version})</p>
<form action="/probe" method="get">
  <label>Target:</label> <input type="text" name="target" placeholder="X.X.X.X/[::X]" value="::1"><br>
  <label>Module:</label> <input type="text" name="module" placeholder="module" value="ping"><br>
  <input type="submit" value="Probe">
</form>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>
"#,
        version = env!("CARGO_PKG_VERSION"),
    )
}
