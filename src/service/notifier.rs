use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::dto::request_dto::SubmitForm;
use crate::model::request::ClientRequest;
use crate::util::email::{send_all_settled, EmailError, EmailMessage, Mailer};

/// Builds and dispatches the domain emails: staff notification and
/// client confirmation at submission time, then acceptance, refusal and
/// completion notices along the admin workflow.
pub struct RequestNotifier {
    mailer: Arc<dyn Mailer>,
    staff_email: String,
    site_base_url: String,
}

impl RequestNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, staff_email: String, site_base_url: String) -> Self {
        RequestNotifier {
            mailer,
            staff_email,
            site_base_url,
        }
    }

    fn status_page_link(&self, tracking_id: &str) -> String {
        format!("{}/suivi.html?id={}", self.site_base_url, tracking_id)
    }

    /// Dispatch the staff notification and the client confirmation
    /// concurrently, awaiting both outcomes. Failures are logged and
    /// swallowed: a notification hiccup must never block a submission.
    #[instrument(skip(self, form), fields(tracking_id = %tracking_id))]
    pub async fn notify_submission(&self, form: &SubmitForm, tracking_id: &str) {
        let messages = vec![
            self.staff_notification(form, tracking_id),
            self.client_confirmation(form, tracking_id),
        ];
        let outcomes = send_all_settled(self.mailer.as_ref(), messages).await;
        for (label, outcome) in ["staff notification", "client confirmation"]
            .iter()
            .zip(outcomes)
        {
            match outcome {
                Ok(()) => info!("{} email sent", label),
                Err(e) => warn!("{} email failed: {}", label, e),
            }
        }
    }

    #[instrument(skip(self, request), fields(tracking_id = %request.tracking_id))]
    pub async fn send_acceptance(
        &self,
        request: &ClientRequest,
        bluefiles_link: Option<&str>,
    ) -> Result<(), EmailError> {
        let message = self.acceptance_email(request, bluefiles_link);
        self.mailer.send_email(message).await
    }

    #[instrument(skip(self, request), fields(tracking_id = %request.tracking_id))]
    pub async fn send_refusal(&self, request: &ClientRequest) -> Result<(), EmailError> {
        let message = self.refusal_email(request);
        self.mailer.send_email(message).await
    }

    #[instrument(skip(self, request), fields(tracking_id = %request.tracking_id))]
    pub async fn send_completion(&self, request: &ClientRequest) -> Result<(), EmailError> {
        let message = self.completion_email(request);
        self.mailer.send_email(message).await
    }

    /// Staff notification: every submitted field, urgent submissions
    /// flagged in the subject.
    pub fn staff_notification(&self, form: &SubmitForm, tracking_id: &str) -> EmailMessage {
        let subject = if form.is_urgent() {
            format!("[URGENT] {}", form.subject_or_default())
        } else {
            form.subject_or_default().to_string()
        };

        let laboratory = form.laboratory.as_deref().unwrap_or("Non spécifié");
        let urgent = form.traitement_urgent.as_deref().unwrap_or("Non");
        let fonction = form.fonction.as_deref().unwrap_or("Non spécifiée");
        let adresse = form.adresse.as_deref().unwrap_or("Non spécifiée");

        let text_body = format!(
            "{subject}\n\n\
             Suivi : {tracking_id}\n\
             Nom : {name}\n\
             Email : {email}\n\
             Laboratoire : {laboratory}\n\
             Fonction : {fonction}\n\
             Adresse : {adresse}\n\
             Urgent : {urgent}\n\n\
             Message :\n{message}\n",
            subject = form.subject_or_default(),
            tracking_id = tracking_id,
            name = form.full_name,
            email = form.email,
            laboratory = laboratory,
            fonction = fonction,
            adresse = adresse,
            urgent = urgent,
            message = form.message,
        );

        let html_body = format!(
            "<h1>{subject}</h1>\
             <p><strong>Suivi :</strong> {tracking_id}</p>\
             <p><strong>Nom :</strong> {name}</p>\
             <p><strong>Email :</strong> {email}</p>\
             <p><strong>Laboratoire :</strong> {laboratory}</p>\
             <p><strong>Fonction :</strong> {fonction}</p>\
             <p><strong>Adresse :</strong> {adresse}</p>\
             <p><strong>Urgent :</strong> {urgent}</p>\
             <hr>\
             <p><strong>Message :</strong></p>\
             <p>{message}</p>",
            subject = html_escape::encode_text(form.subject_or_default()),
            tracking_id = tracking_id,
            name = html_escape::encode_text(&form.full_name),
            email = html_escape::encode_text(&form.email),
            laboratory = html_escape::encode_text(laboratory),
            fonction = html_escape::encode_text(fonction),
            adresse = html_escape::encode_text(adresse),
            urgent = html_escape::encode_text(urgent),
            message = html_escape::encode_text(&form.message).replace('\n', "<br>"),
        );

        EmailMessage::new(self.staff_email.clone(), subject)
            .with_text_body(text_body)
            .with_html_body(html_body)
    }

    /// Client confirmation: tracking id plus the status-page link.
    pub fn client_confirmation(&self, form: &SubmitForm, tracking_id: &str) -> EmailMessage {
        let link = self.status_page_link(tracking_id);

        let text_body = format!(
            "Bonjour {name},\n\n\
             Merci de nous avoir contactés !\n\
             Nous avons bien reçu votre demande et nous vous répondrons sous 24 heures ouvrées.\n\n\
             Votre numéro de suivi : {tracking_id}\n\
             Vous pouvez consulter l'avancement de votre demande ici : {link}\n\n\
             À très bientôt,\nL'équipe AnaByo",
            name = form.full_name,
            tracking_id = tracking_id,
            link = link,
        );

        let html_body = format!(
            "<p>Bonjour {name},</p>\
             <p>Merci de nous avoir contactés !</p>\
             <p>Nous avons bien reçu votre demande et nous vous répondrons sous 24 heures ouvrées.</p>\
             <p><strong>Votre numéro de suivi :</strong> {tracking_id}</p>\
             <p><a href=\"{link}\">Suivre ma demande</a></p>\
             <p>À très bientôt,<br>L'équipe AnaByo</p>",
            name = html_escape::encode_text(&form.full_name),
            tracking_id = tracking_id,
            link = html_escape::encode_text(&link),
        );

        EmailMessage::new(
            form.email.clone(),
            "Confirmation de votre demande chez AnaByo".to_string(),
        )
        .with_text_body(text_body)
        .with_html_body(html_body)
    }

    pub fn acceptance_email(
        &self,
        request: &ClientRequest,
        bluefiles_link: Option<&str>,
    ) -> EmailMessage {
        let link_line = match bluefiles_link {
            Some(link) if !link.is_empty() => {
                format!("Déposez vos échantillons de fichiers ici : {}", link)
            }
            _ => "Un lien de dépôt vous sera communiqué prochainement.".to_string(),
        };

        let text_body = format!(
            "Bonjour {name},\n\n\
             Bonne nouvelle : votre demande {tracking_id} a été acceptée.\n\
             {link_line}\n\n\
             L'équipe AnaByo",
            name = request.representant,
            tracking_id = request.tracking_id,
            link_line = link_line,
        );

        let html_body = format!(
            "<p>Bonjour {name},</p>\
             <p>Bonne nouvelle : votre demande <strong>{tracking_id}</strong> a été acceptée.</p>\
             <p>{link_line}</p>\
             <p>L'équipe AnaByo</p>",
            name = html_escape::encode_text(&request.representant),
            tracking_id = request.tracking_id,
            link_line = html_escape::encode_text(&link_line),
        );

        EmailMessage::new(
            request.email_client.clone(),
            format!("Votre demande {} a été acceptée", request.tracking_id),
        )
        .with_text_body(text_body)
        .with_html_body(html_body)
    }

    pub fn refusal_email(&self, request: &ClientRequest) -> EmailMessage {
        let text_body = format!(
            "Bonjour {name},\n\n\
             Après étude, nous ne sommes malheureusement pas en mesure de donner suite \
             à votre demande {tracking_id}.\n\
             N'hésitez pas à nous recontacter pour toute autre prestation.\n\n\
             L'équipe AnaByo",
            name = request.representant,
            tracking_id = request.tracking_id,
        );

        let html_body = format!(
            "<p>Bonjour {name},</p>\
             <p>Après étude, nous ne sommes malheureusement pas en mesure de donner suite \
             à votre demande <strong>{tracking_id}</strong>.</p>\
             <p>N'hésitez pas à nous recontacter pour toute autre prestation.</p>\
             <p>L'équipe AnaByo</p>",
            name = html_escape::encode_text(&request.representant),
            tracking_id = request.tracking_id,
        );

        EmailMessage::new(
            request.email_client.clone(),
            format!("Votre demande {}", request.tracking_id),
        )
        .with_text_body(text_body)
        .with_html_body(html_body)
    }

    pub fn completion_email(&self, request: &ClientRequest) -> EmailMessage {
        let text_body = format!(
            "Bonjour {name},\n\n\
             Votre demande {tracking_id} est terminée : vos résultats sont disponibles.\n\
             Nous revenons vers vous par email avec les documents associés.\n\n\
             Merci de votre confiance,\nL'équipe AnaByo",
            name = request.representant,
            tracking_id = request.tracking_id,
        );

        let html_body = format!(
            "<p>Bonjour {name},</p>\
             <p>Votre demande <strong>{tracking_id}</strong> est terminée : vos résultats sont disponibles.</p>\
             <p>Nous revenons vers vous par email avec les documents associés.</p>\
             <p>Merci de votre confiance,<br>L'équipe AnaByo</p>",
            name = html_escape::encode_text(&request.representant),
            tracking_id = request.tracking_id,
        );

        EmailMessage::new(
            request.email_client.clone(),
            format!("Votre demande {} est terminée", request.tracking_id),
        )
        .with_text_body(text_body)
        .with_html_body(html_body)
    }
}
