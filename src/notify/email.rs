use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::target::EmailTarget;
use super::{render, Notifier, OutageNotice};

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl EmailNotifier {
    pub fn from_target(t: &EmailTarget) -> Result<Self> {
        let mut builder = if t.tls {
            if t.port == Some(587) {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&t.host)
                    .context("invalid smtp host")?
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&t.host)
                    .context("invalid smtp host")?
            }
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&t.host)
        };
        if let Some(port) = t.port {
            builder = builder.port(port);
        }
        if let (Some(user), Some(pass)) = (&t.user, &t.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let from = t
            .from
            .parse::<Mailbox>()
            .context("invalid `from` address")?;
        let to = t
            .to
            .iter()
            .map(|a| a.parse::<Mailbox>().with_context(|| format!("invalid `to` address {a}")))
            .collect::<Result<Vec<Mailbox>>>()?;

        Ok(Self {
            mailer: builder.build(),
            from,
            to,
        })
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, notice: &OutageNotice) -> Result<()> {
        let body = format!(
            "{}\n\nSource: {}\nChecked: {}\n",
            render::body(notice),
            notice.page_url,
            notice.fetched_at.to_rfc3339()
        );

        let mut msg = Message::builder()
            .from(self.from.clone())
            .subject(render::title(notice))
            .header(header::ContentType::TEXT_PLAIN);
        for to in &self.to {
            msg = msg.to(to.clone());
        }
        let msg = msg.body(body).context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
