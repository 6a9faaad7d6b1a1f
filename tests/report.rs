//! Integration tests for report rendering.

use sql_parity::report::render_markdown;
use sql_parity::{FrameworkColumns, InterfaceReport, Status, compare_queries};

fn interface(id: &str, name: &str, send: (&str, &str), receive: (&str, &str)) -> InterfaceReport {
    let framework = FrameworkColumns::default();
    InterfaceReport::new(id, name)
        .with_send(compare_queries(send.0, send.1, &framework))
        .with_receive(compare_queries(receive.0, receive.1, &framework))
}

#[test]
fn test_report_summary_and_details() {
    let reports = [
        interface(
            "IF-0001",
            "Order export",
            (
                "SELECT EAI_SEQ_ID, DATA_INTERFACE_TYPE_CODE, order_no FROM tb_order",
                "SELECT order_no, EAI_SEQ_ID, DATA_INTERFACE_TYPE_CODE FROM tb_order",
            ),
            (
                "INSERT INTO tb_order (order_no, qty) VALUES (:order_no, :qty)",
                "INSERT INTO tb_order (order_no, qty) VALUES (:order_no, :quantity)",
            ),
        ),
        interface(
            "IF-0002",
            "Stock sync",
            ("SELECT a FROM tb_stock", "SELECT a FROM"),
            ("INSERT INTO tb_stock (a) VALUES (1)", "UPDATE tb_stock SET a = 1"),
        ),
    ];

    assert_eq!(reports[0].status(), Some(Status::Different));
    assert_eq!(reports[1].status(), Some(Status::NotComparable));

    let markdown = render_markdown(&reports);
    assert!(markdown.contains("| IF-0001 | Order export | equal | different |"));
    assert!(markdown.contains(
        "| IF-0002 | Stock sync | comparison not possible | comparison not possible |"
    ));
    assert!(markdown.contains("| qty | :qty | :quantity |"));
    assert!(markdown.contains("right statement: Missing table name"));
    assert!(markdown.contains("right statement: Unsupported statement kind: UPDATE"));
    assert!(markdown.contains(
        "- warning: Required framework column EAI_SEQ_ID missing from receive statement"
    ));
}

#[test]
fn test_status_presentation() {
    let labels: Vec<(&str, &str)> = [Status::Equal, Status::Different, Status::NotComparable]
        .into_iter()
        .map(|status| (status.label(), status.fill_colour()))
        .collect();
    assert_eq!(
        labels,
        [
            ("equal", "C6EFCE"),
            ("different", "FFC7CE"),
            ("comparison not possible", "DDDDDD"),
        ]
    );
}

#[cfg(feature = "json")]
#[test]
fn test_json_round_trip_of_configuration() {
    let columns = FrameworkColumns::from_json(
        r#"{
            "send": { "required": ["eai_seq_id"] },
            "receive": { "required": ["eai_seq_id"], "expected": { "flag": "'N'" } }
        }"#,
    )
    .unwrap();
    assert!(columns.send.contains("EAI_SEQ_ID"));
    assert_eq!(columns.receive.expected_value("FLAG"), Some("'N'"));
    assert_eq!(columns.receive.required().collect::<Vec<_>>(), ["EAI_SEQ_ID", "FLAG"]);

    assert!(FrameworkColumns::from_json("{ \"send\": 1 }").is_err());

    let json = sql_parity::report::to_json(&[interface(
        "IF-0003",
        "Json",
        ("SELECT a FROM t", "SELECT a FROM t"),
        ("INSERT INTO t (a) VALUES (1)", "INSERT INTO t (a) VALUES (2)"),
    )])
    .unwrap();
    assert!(json.contains("\"IF-0003\""));
}
