//! Prompt templates sent to the language model, and the fixed replies.

use crate::models::Domain;

pub const REJECTION_MESSAGE: &str =
    "Désolé, je n'ai pas compris votre demande. Pouvez-vous reformuler ?";

pub const CONFIRMATION_PREFIX: &str = "Votre demande a bien été enregistrée.";

pub fn intent_prompt(user_text: &str) -> String {
    format!(
        r#"
Tu joues le rôle d'un classificateur intelligent d'intention utilisateur.

Analyse attentivement le message suivant et classe-le uniquement dans **l'une des catégories suivantes** :

- **web** : si la question concerne les informations disponibles sur le site de l'école (ex : formations, campus, calendrier, admissions, contacts, etc.).
- **doc** : si la question concerne des documents internes comme le règlement intérieur, les politiques de l'école, les procédures, etc.
- **action** : si l'utilisateur cherche à effectuer une action concrète (inscription, dépôt de dossier, demande administrative, formulaire, etc.).
- **none** : si le message ne correspond à aucune de ces catégories ou est trop vague.

Donne uniquement l'étiquette correspondante (web, doc, action ou none), sans justification.

Message utilisateur : "{user_text}"
Réponse attendue (web, doc, action, none) :
"#
    )
}

/// Grounding prompt; the context is inserted verbatim ahead of the question.
pub fn answer_prompt(domain: Domain, question: &str, context: &str) -> String {
    let (source, instruction) = match domain {
        Domain::Site => (
            "les informations suivantes",
            "Réponds à la question suivante de manière claire et naturelle",
        ),
        Domain::Regulation => (
            "les documents internes suivants",
            "Réponds précisément à la question suivante",
        ),
    };
    format!("En te basant sur {source} :\n{context}\n\n{instruction} :\n{question}\n")
}

pub fn extraction_prompt(user_text: &str) -> String {
    format!(
        r#"
Tu joues le rôle d'un assistant qui résume les informations clés d'une demande utilisateur.

Extrait :
- le prénom (s'il est mentionné)
- le nom (s'il est mentionné)
- l'action ou la demande principale de l'utilisateur
- la date actuelle (au format JJ/MM/AAAA)

Formate la réponse au format suivant :

Prénom : ...
Nom : ...
Action demandée : ...
Date : ...

Message utilisateur : "{user_text}"
"#
    )
}

pub fn confirmation(summary: &str) -> String {
    format!("{CONFIRMATION_PREFIX}\n\nRésumé :\n{summary}")
}
