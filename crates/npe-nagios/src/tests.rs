use crate::compact;
use crate::perfdata::{parse_perfdata_output, PerfData};
use crate::perfvalue::PerfValue;
use crate::plugin::Plugin;
use crate::result::{PluginOutputDecoder, PluginResult};
use crate::state::ExitCode;
use crate::threshold::Threshold;

fn perf_value(s: &str) -> PerfValue {
    s.parse().expect(s)
}

fn threshold(s: &str) -> Threshold {
    s.parse().expect(s)
}

fn perf_data(s: &str) -> PerfData {
    s.parse().expect(s)
}

#[test]
fn compact_drops_empty_entries() {
    let have = vec![
        "one".to_string(),
        String::new(),
        "two".to_string(),
        String::new(),
    ];

    assert_eq!(compact(&have), vec!["one".to_string(), "two".to_string()]);
    assert!(compact(&[]).is_empty());
}

#[test]
fn exit_code_round_trip() {
    assert_eq!(ExitCode::from(0), ExitCode::Ok);
    assert_eq!(ExitCode::from(2), ExitCode::Critical);
    assert_eq!(ExitCode::from(4), ExitCode::Dependent);
    assert_eq!(ExitCode::from(7), ExitCode::Other(7));
    assert_eq!(ExitCode::Other(7).code(), 7);
    assert_eq!(ExitCode::Warning.to_string(), "WARNING");
    assert_eq!(ExitCode::Other(7).to_string(), "ExitCode(7)");
}

#[test]
fn parse_perf_value() {
    assert_eq!(perf_value(""), PerfValue::undefined());
    assert_eq!(perf_value("U"), PerfValue::undefined());
    assert_eq!(perf_value("u"), PerfValue::undefined());
    assert_eq!(perf_value("123"), PerfValue::float(123.0));
    assert_eq!(perf_value("12.3"), PerfValue::float(12.3));
    assert_eq!(perf_value("25%"), PerfValue::percent(25.0));
    assert_eq!(perf_value("9001rpm"), PerfValue::unit(9001.0, "rpm"));
    assert_eq!(perf_value(".5ppm"), PerfValue::unit(0.5, "ppm"));
    // purely-unit input keeps a zero value
    assert_eq!(perf_value("rpm"), PerfValue::unit(0.0, "rpm"));

    assert!("1.2.5".parse::<PerfValue>().is_err());
}

#[test]
fn perf_value_equality_considers_unit_when_undefined() {
    let plain = PerfValue::undefined();
    let with_unit = PerfValue {
        unit: "test".to_string(),
        ..PerfValue::undefined()
    };

    assert_ne!(plain, with_unit);
    assert_ne!(PerfValue::undefined(), PerfValue::float(1.2));
    assert_ne!(PerfValue::unit(1.2, "test"), PerfValue::float(1.2));
    assert_eq!(PerfValue::unit(1.2, "test"), PerfValue::unit(1.2, "test"));
}

#[test]
fn perf_value_render() {
    assert_eq!(PerfValue::default().to_string(), "0");
    assert_eq!(PerfValue::undefined().to_string(), "U");
    assert_eq!(PerfValue::float(1.203).to_string(), "1.203");
    assert_eq!(PerfValue::percent(95.0001).to_string(), "95.0001%");
    assert_eq!(PerfValue::unit(9001.0, "rpm").to_string(), "9001rpm");
    assert_eq!(PerfValue::float(0.01).to_string(), "0.01");
    assert_eq!(PerfValue::float(500.0).to_string(), "500");
}

#[test]
fn perf_value_round_trip() {
    for s in ["U", "123", "12.3", "25%", "9001rpm"] {
        assert_eq!(perf_value(s).to_string(), s, "round trip of {s}");
    }
}

#[test]
fn threshold_alerts() {
    // (literal, alerting values, passing values)
    let cases: &[(&str, &[f64], &[f64])] = &[
        ("10", &[-1.0, 11.0], &[0.0, 5.0, 10.0]),
        ("10:", &[-1.0, 0.0, 9.0], &[10.0, 11.0]),
        ("~:10", &[11.0], &[-1.0, 0.0, 9.0, 10.0]),
        ("10:20", &[-1.0, 9.0, 21.0], &[10.0, 15.0, 20.0]),
        ("@10:20", &[10.0, 11.0, 19.0, 20.0], &[-1.0, 0.0, 9.0, 21.0]),
        ("", &[-1.0], &[0.0, 1.0]),
        (":", &[-1.0], &[0.0, 1.0]),
    ];

    for (have, alerts, misses) in cases {
        let t = threshold(have);
        for a in *alerts {
            assert!(t.alert(*a), "range {have} should alert for {a}");
        }
        for m in *misses {
            assert!(!t.alert(*m), "range {have} should not alert for {m}");
        }
    }
}

#[test]
fn threshold_parse_errors() {
    assert!("bac:10".parse::<Threshold>().is_err());
    assert!("10:bac".parse::<Threshold>().is_err());
    assert!("10:@20".parse::<Threshold>().is_err());
    assert!("@:10".parse::<Threshold>().is_err());
    assert!("@".parse::<Threshold>().is_err());
    assert!("1:2:3".parse::<Threshold>().is_err());
}

#[test]
fn threshold_equality_is_structural() {
    assert_eq!(Threshold::inside(1.0, 2.0), Threshold::inside(1.0, 2.0));
    assert_eq!(Threshold::outside(1.0, 2.0), Threshold::outside(1.0, 2.0));
    assert_eq!(Threshold::above(1.0), Threshold::above(1.0));
    assert_eq!(Threshold::below(2.0), Threshold::below(2.0));
    assert_eq!(Threshold::upper(1.0), Threshold::upper(1.0));

    assert_ne!(Threshold::outside(1.0, 2.0), Threshold::inside(1.0, 2.0));
    assert_ne!(Threshold::above(1.0), Threshold::upper(1.0));
    assert_ne!(Threshold::below(2.0), Threshold::upper(2.0));
}

#[test]
fn threshold_render() {
    assert_eq!(Threshold::outside(10.0, 20.0).to_string(), "10:20");
    assert_eq!(Threshold::inside(10.0, 20.0).to_string(), "@10:20");
    assert_eq!(Threshold::above(10.0).to_string(), "~:10");
    assert_eq!(Threshold::below(10.0).to_string(), "10:");
    assert_eq!(Threshold::upper(10.0).to_string(), "10");
}

#[test]
fn threshold_render_preserves_literals() {
    for s in ["10", "10:", "~:10", "10:20", "@10:20", ":"] {
        assert_eq!(threshold(s).to_string(), s, "round trip of {s}");
    }
}

#[test]
fn parse_perf_data() {
    assert_eq!(perf_data("empty=;;;;"), PerfData::undefined("empty"));
    assert_eq!(perf_data("test="), PerfData::undefined("test"));
    assert_eq!(
        perf_data("pct=50%"),
        PerfData::value("pct", PerfValue::percent(50.0))
    );
    assert_eq!(
        perf_data("test=123"),
        PerfData::value("test", PerfValue::float(123.0))
    );
    assert_eq!(
        perf_data("'test'=123"),
        PerfData::value("test", PerfValue::float(123.0))
    );
    assert_eq!(
        perf_data("'unit test'=123"),
        PerfData::value("unit test", PerfValue::float(123.0))
    );
    assert_eq!(
        perf_data("ths=50%;10;20"),
        PerfData::thresholds(
            "ths",
            PerfValue::percent(50.0),
            Some(Threshold::upper(10.0)),
            Some(Threshold::upper(20.0)),
        )
    );
    assert_eq!(
        perf_data("ths=50%;15:25;10:30"),
        PerfData::thresholds(
            "ths",
            PerfValue::percent(50.0),
            Some(Threshold::outside(15.0, 25.0)),
            Some(Threshold::outside(10.0, 30.0)),
        )
    );
    assert_eq!(
        perf_data("limits=50%;;;10;200"),
        PerfData::scoped("limits", PerfValue::percent(50.0), 10, 200)
    );
    assert_eq!(
        perf_data("both=50%;10;20;10;200"),
        PerfData::full(
            "both",
            PerfValue::percent(50.0),
            Some(Threshold::upper(10.0)),
            Some(Threshold::upper(20.0)),
            10,
            200,
        )
    );

    assert!("".parse::<PerfData>().is_err());
    assert!("=1".parse::<PerfData>().is_err());
    assert!("''=1".parse::<PerfData>().is_err());
    assert!("a=1=2".parse::<PerfData>().is_err());
    assert!("bad=1;nope".parse::<PerfData>().is_err());
    assert!("bad=1;;;1.5".parse::<PerfData>().is_err());
}

#[test]
fn perf_data_limits_are_distinct_from_zero() {
    assert_ne!(
        PerfData::value("test", PerfValue::percent(50.0)),
        PerfData::scoped("test", PerfValue::percent(50.0), 0, 0)
    );
    assert_ne!(PerfData::undefined("test"), perf_data("test=1"));
    assert_eq!(PerfData::undefined("test"), PerfData::undefined("test"));
}

#[test]
fn perf_data_max_reports_percent_scale() {
    let pct = PerfData::scoped("pct", PerfValue::percent(50.0), 0, 0);
    assert_eq!(pct.max(), 100);
    // only the accessor applies the heuristic
    assert_eq!(pct.to_string(), "pct=50%;;;0;0");

    let plain = PerfData::scoped("plain", PerfValue::float(50.0), 0, 0);
    assert_eq!(plain.max(), 0);
    assert_eq!(plain.min(), 0);

    let scoped = PerfData::scoped("mb", PerfValue::unit(50.0, "MB"), 10, 200);
    assert_eq!(scoped.min(), 10);
    assert_eq!(scoped.max(), 200);
}

#[test]
fn perf_data_alerts() {
    let p = perf_data("load=5;0:3;0:8");
    assert!(p.warning_alert());
    assert!(!p.critical_alert());

    let undef = perf_data("load=U;0:3;0:8");
    assert!(!undef.warning_alert());
    assert!(!undef.critical_alert());

    let bare = perf_data("load=5");
    assert!(!bare.warning_alert());
    assert!(!bare.critical_alert());
}

#[test]
fn perf_data_render() {
    assert_eq!(perf_data("test=123").to_string(), "test=123");
    assert_eq!(perf_data("'unit test'=123").to_string(), "'unit test'=123");
    assert_eq!(perf_data("ths=50%;10;20").to_string(), "ths=50%;10;20");
    assert_eq!(
        perf_data("both=50%;10;20;10;200").to_string(),
        "both=50%;10;20;10;200"
    );
    // trailing empty fields are trimmed
    assert_eq!(perf_data("empty=;;;;").to_string(), "empty=U");
    assert_eq!(
        perf_data("limits=50%;;;10;200").to_string(),
        "limits=50%;;;10;200"
    );
}

#[test]
fn perf_data_round_trip() {
    for s in [
        "test=123",
        "'unit test'=12ms",
        "ths=50%;15:25;10:30",
        "both=50%;@10:20;~:30;10;200",
        "limits=50%;;;10;200",
    ] {
        let parsed = perf_data(s);
        assert_eq!(parsed.to_string(), s, "render of {s}");
        assert_eq!(perf_data(&parsed.to_string()), parsed, "reparse of {s}");
    }
}

#[test]
fn parse_perfdata_output_splits_on_whitespace() {
    let parsed = parse_perfdata_output("load=0.5;1;2;0;10 'rt avg'=12ms").unwrap();

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].label(), "load");
    assert_eq!(parsed[0].float(), 0.5);
    assert_eq!(parsed[0].warning(), "1");
    assert_eq!(parsed[0].critical(), "2");
    assert_eq!(parsed[0].min(), 0);
    assert_eq!(parsed[0].max(), 10);
    assert_eq!(parsed[1].label(), "rt avg");
    assert_eq!(parsed[1].float(), 12.0);

    assert!(parse_perfdata_output("ok=1 =2").is_err());
}

async fn decode(input: &str) -> Result<PluginResult, crate::ParseError> {
    let mut result = PluginResult::default();
    PluginOutputDecoder::new(input.as_bytes())
        .decode(&mut result)
        .await?;
    Ok(result)
}

#[tokio::test]
async fn decode_summary_only() {
    let result = decode("OK: fine\n").await.unwrap();

    assert_eq!(result.output, "OK: fine");
    assert!(result.trailer.is_empty());
    assert!(result.perf_data.is_empty());
}

#[tokio::test]
async fn decode_summary_with_perfdata() {
    let result = decode("OK: fine | load=0.5;1;2;0;10 'rt avg'=12ms\n")
        .await
        .unwrap();

    assert_eq!(result.output, "OK: fine");
    assert_eq!(result.perf_data.len(), 2);
    assert_eq!(result.perf_data[0].label(), "load");
    assert_eq!(result.perf_data[1].label(), "rt avg");
}

#[tokio::test]
async fn decode_multi_line_output() {
    let result = decode("WARNING: almost full | used=81%\ndisk /var is filling up | inodes=12\nsecond trailer\n")
        .await
        .unwrap();

    assert_eq!(result.output, "WARNING: almost full");
    assert_eq!(
        result.trailer,
        vec![
            "disk /var is filling up".to_string(),
            "second trailer".to_string()
        ]
    );
    assert_eq!(result.perf_data.len(), 2);
    assert_eq!(result.perf_data[1].label(), "inodes");
}

#[tokio::test]
async fn decode_rejects_extra_delimiters() {
    assert!(decode("OK | a=1 | b=2\n").await.is_err());
}

#[tokio::test]
async fn decode_rejects_malformed_perfdata() {
    assert!(decode("OK | =1\n").await.is_err());
}

#[test]
fn plugin_result_render() {
    let mut result = decode_blocking("OK: fine | load=0.5;1;2;0;10");
    assert_eq!(result.to_string(), "OK: fine | load=0.5;1;2;0;10");

    result.status = ExitCode::Warning;
    assert_eq!(
        result.to_string(),
        "WARNING: OK: fine | load=0.5;1;2;0;10"
    );

    let plain = decode_blocking("all good");
    assert_eq!(plain.to_string(), "OK: all good");
}

fn decode_blocking(input: &str) -> PluginResult {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(decode(input))
        .unwrap()
}

#[tokio::test]
async fn run_captures_output_and_exit_code() {
    let plugin = Plugin::with_arguments(
        "/bin/sh",
        vec![
            "-c".to_string(),
            "echo 'OK: up | load=0.5'; echo noise >&2; exit 1".to_string(),
        ],
    );

    let result = plugin.run().await.unwrap();

    assert_eq!(result.status, ExitCode::Warning);
    assert_eq!(result.output, "OK: up");
    assert_eq!(result.perf_data.len(), 1);
    assert_eq!(result.stderr.as_deref(), Some("noise\n"));
}

#[tokio::test]
async fn run_does_not_inherit_environment() {
    std::env::set_var("NPE_RUN_TEST_LEAK", "leaked");
    let plugin = Plugin::new(
        "/bin/sh",
        vec![
            "-c".to_string(),
            "echo \"OK: ${NPE_RUN_TEST_LEAK:-clean} ${INJECTED:-unset}\"".to_string(),
        ],
        vec![("INJECTED".to_string(), "present".to_string())],
    );

    let result = plugin.run().await.unwrap();

    assert_eq!(result.output, "OK: clean present");
}

#[tokio::test]
async fn run_reports_spawn_failure() {
    let plugin = Plugin::with_arguments("/nonexistent/check_nothing", Vec::new());

    assert!(plugin.run().await.is_err());
}

#[tokio::test]
async fn run_is_cancelled_by_timeout() {
    let plugin = Plugin::with_arguments("/bin/sleep", vec!["5".to_string()]);

    let run = tokio::time::timeout(std::time::Duration::from_millis(200), plugin.run()).await;

    assert!(run.is_err());
}

#[test]
fn plugin_command_line() {
    let plugin = Plugin::with_arguments("/bin/echo", vec!["-n".to_string(), "hi".to_string()]);

    assert_eq!(plugin.command_line(), "/bin/echo -n hi");
}
