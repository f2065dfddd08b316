//! A full run: roster file and attachment directory on disk, delivery to a
//! scripted in-process SMTP server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use groupmail_core::{
    AttachmentIndex, ConfirmOutcome, MessageTemplate, Phase, ReviewWorkflow, Roster, Security,
    SendError, SmtpConfig, SmtpMailer, Target,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const ROSTER: &str = r#"{
    "departments": [
        ["G1", "Sciences", "D1", "Math"],
        ["G1", "Sciences", "D1", "Math"],
        ["G2", "Arts", "D2", "Music"]
    ],
    "recipients": [
        ["Alice Smith", "D1", "Math", "Alice", "是", "alice@school.edu", ""],
        ["Bob Jones", "D1", "Math", "Bob", "", "bob@school.edu", "head"],
        ["Carol White", "D2", "Music", "Carol", "否", "carol@school.edu", ""]
    ]
}"#;

/// Answers each client line with the next scripted reply, swallowing the
/// message body between `354` and the terminating dot.
async fn scripted_server(replies: Vec<&'static str>) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut reader = BufReader::new(read_half);
        write_half.write_all(b"220 mx.school.edu ESMTP\r\n").await.unwrap();

        let mut received = Vec::new();
        let mut replies = replies.into_iter();
        let mut in_data = false;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await.unwrap() == 0 {
                break;
            }
            let line = line.trim_end().to_string();
            received.push(line.clone());
            if in_data && line != "." {
                continue;
            }
            in_data = false;

            let Some(reply) = replies.next() else { break };
            write_half.write_all(reply.as_bytes()).await.unwrap();
            in_data = reply.starts_with("354");
            if line == "QUIT" {
                break;
            }
        }
        received
    });

    (port, handle)
}

fn mailer(port: u16) -> SmtpMailer {
    SmtpMailer::new(
        SmtpConfig {
            host: "127.0.0.1".into(),
            port,
            security: Security::None,
            ..SmtpConfig::default()
        },
        "office@school.edu",
    )
}

async fn fixture(dir: &Path) -> (groupmail_core::Directory, AttachmentIndex) {
    let roster_path = dir.join("roster.json");
    tokio::fs::write(&roster_path, ROSTER).await.unwrap();

    let outbox = dir.join("outbox");
    tokio::fs::create_dir(&outbox).await.unwrap();
    for name in ["D1_report.pdf", "000_all.pdf", "D2_other.pdf"] {
        tokio::fs::write(outbox.join(name), name.as_bytes()).await.unwrap();
    }

    let directory = Roster::load(&roster_path).await.unwrap().into_directory().unwrap();
    let index = AttachmentIndex::scan(Some(&outbox)).unwrap();
    (directory, index)
}

#[tokio::test]
async fn confirmed_group_is_delivered_over_smtp() {
    let dir = tempfile::tempdir().unwrap();
    let (directory, index) = fixture(dir.path()).await;
    assert_eq!(directory.counts().recipients, 3);

    let (port, server) = scripted_server(vec![
        "250-mx.school.edu\r\n250 8BITMIME\r\n",
        "250 sender ok\r\n",
        "250 rcpt ok\r\n",
        "250 rcpt ok\r\n",
        "354 go ahead\r\n",
        "250 queued\r\n",
        "221 bye\r\n",
    ])
    .await;

    let mut workflow = ReviewWorkflow::new(
        &directory,
        &index,
        MessageTemplate::new("预算通知", "Please review."),
        dir.path().join("run.txt"),
    );

    let pending = workflow.pending_message().unwrap();
    assert_eq!(pending.to, "bob@school.edu");
    assert_eq!(pending.cc, "alice@school.edu");
    let names: Vec<_> = pending
        .attachments
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["000_all.pdf", "D1_report.pdf"]);

    let outcome = workflow.confirm(&mailer(port)).await;
    assert!(matches!(outcome, ConfirmOutcome::Sent { ref group } if group == "G1-Sciences"));
    assert_eq!(workflow.phase(), Phase::AtGroup(1));

    let received = server.await.unwrap();
    assert_eq!(received[0], "EHLO localhost");
    assert_eq!(received[1], "MAIL FROM:<office@school.edu>");
    assert_eq!(received[2], "RCPT TO:<bob@school.edu>");
    assert_eq!(received[3], "RCPT TO:<alice@school.edu>");
    assert_eq!(received[4], "DATA");
    assert!(received.contains(&"To: bob@school.edu".to_string()));
    assert!(received.contains(&"Cc: alice@school.edu".to_string()));
    assert!(received.iter().any(|l| l.starts_with("Subject: =?utf-8?B?")));
    assert!(received.iter().any(|l| l.starts_with("Content-Type: multipart/mixed")));
    assert_eq!(received.last().unwrap(), "QUIT");

    assert!(workflow.skip());
    let summary = workflow.summary().unwrap();
    assert_eq!((summary.groups, summary.sent), (2, 1));
}

#[tokio::test]
async fn rejected_recipient_keeps_group_open() {
    let dir = tempfile::tempdir().unwrap();
    let (directory, index) = fixture(dir.path()).await;
    let (port, _server) = scripted_server(vec![
        "250 mx.school.edu\r\n",
        "250 sender ok\r\n",
        "550 no such user\r\n",
    ])
    .await;

    let mut workflow =
        ReviewWorkflow::new(&directory, &index, MessageTemplate::new("S", "B"), "log");
    assert!(workflow.toggle(Target::Recipient(0)));

    let outcome = workflow.confirm(&mailer(port)).await;
    let ConfirmOutcome::Failed { group, error } = outcome else {
        panic!("expected failure");
    };
    assert_eq!(group, "G1-Sciences");
    assert!(matches!(error, SendError::Rejected(ref e) if e.is_permanent()));
    assert_eq!(workflow.phase(), Phase::AtGroup(0));
    assert_eq!(workflow.sent(), 0);
    assert!(!workflow.current().unwrap().recipients()[0].included);
}

#[tokio::test]
async fn vanished_attachment_fails_before_connecting() {
    let dir = tempfile::tempdir().unwrap();
    let (directory, index) = fixture(dir.path()).await;
    tokio::fs::remove_file(dir.path().join("outbox").join("D1_report.pdf"))
        .await
        .unwrap();

    let mut workflow =
        ReviewWorkflow::new(&directory, &index, MessageTemplate::new("S", "B"), "log");
    // Port 9 is never dialled: the attachment is read first.
    let outcome = workflow.confirm(&mailer(9)).await;
    assert!(matches!(
        outcome,
        ConfirmOutcome::Failed { error: SendError::Attachment { .. }, .. }
    ));
    assert_eq!(workflow.phase(), Phase::AtGroup(0));
}

#[tokio::test]
async fn empty_selection_is_refused_by_smtp_mailer() {
    let dir = tempfile::tempdir().unwrap();
    let (directory, index) = fixture(dir.path()).await;
    let mut workflow =
        ReviewWorkflow::new(&directory, &index, MessageTemplate::new("S", "B"), "log");
    workflow.toggle(Target::Recipient(0));
    workflow.toggle(Target::Recipient(1));

    let outcome = workflow.confirm(&mailer(9)).await;
    assert!(matches!(
        outcome,
        ConfirmOutcome::Failed { error: SendError::NoRecipients, .. }
    ));
}

#[tokio::test]
async fn server_without_plain_auth_fails_the_group() {
    let dir = tempfile::tempdir().unwrap();
    let (directory, index) = fixture(dir.path()).await;
    let (port, server) = scripted_server(vec!["250-mx.school.edu\r\n250 AUTH LOGIN\r\n"]).await;

    let mailer = SmtpMailer::new(
        SmtpConfig {
            host: "127.0.0.1".into(),
            port,
            security: Security::None,
            username: "office".into(),
            password: "secret".into(),
        },
        "office@school.edu",
    );
    let mut workflow =
        ReviewWorkflow::new(&directory, &index, MessageTemplate::new("S", "B"), "log");

    let outcome = workflow.confirm(&mailer).await;
    assert!(matches!(
        outcome,
        ConfirmOutcome::Failed { error: SendError::Authentication(_), .. }
    ));
    assert_eq!(workflow.phase(), Phase::AtGroup(0));
    assert_eq!(server.await.unwrap(), vec!["EHLO localhost"]);
}
