//! CSV export of inbox messages

use smsgate_core::ReceivedMessage;

pub const CSV_HEADER: &str = "Phone,Message,Time,Port";

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Header plus one fully quoted row per message, `\n` separated
pub fn received_to_csv(messages: &[ReceivedMessage]) -> String {
    let mut rows = Vec::with_capacity(messages.len() + 1);
    rows.push(CSV_HEADER.to_string());

    for msg in messages {
        let row = [&msg.phone, &msg.message, &msg.time, &msg.port]
            .iter()
            .map(|field| quote(field))
            .collect::<Vec<_>>()
            .join(",");
        rows.push(row);
    }

    rows.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_quotes_every_field() {
        let messages = vec![
            ReceivedMessage {
                phone: "5493815682688".into(),
                message: "Dijo \"hola\", chau".into(),
                time: "20251219203330".into(),
                port: "2".into(),
            },
            ReceivedMessage {
                phone: "111".into(),
                message: String::new(),
                time: "20251219203336".into(),
                port: "1".into(),
            },
        ];

        let csv = received_to_csv(&messages);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Phone,Message,Time,Port");
        assert_eq!(
            lines[1],
            r#""5493815682688","Dijo ""hola"", chau","20251219203330","2""#
        );
        assert_eq!(lines[2], r#""111","","20251219203336","1""#);
    }

    #[test]
    fn test_csv_header_only() {
        assert_eq!(received_to_csv(&[]), CSV_HEADER);
    }
}
