//! Prompt text and fixed replies, per locale.

use concierge_core::intent::{Capability, Locale};

const CLASSIFIER_WITH_HISTORY_ES: &str = "\
Eres un recepcionista de un sistema de gestión de clientes.

Clasifica la intención del usuario en UNA palabra basándote en el contexto de la conversación:

- crear → registrar, agregar, guardar, añadir clientes
- consultar → listar, ver, buscar, mostrar clientes

IMPORTANTE: Considera el historial de la conversación. Si el usuario está proporcionando \
información adicional sobre una solicitud anterior, mantén la misma intención.

Ejemplos:
- Usuario: \"Crea un cliente\" → crear
- Usuario: \"Su nombre es Juan\" (continuando) → crear
- Usuario: \"Lista los clientes\" → consultar
- Usuario: \"Muéstrame los que tienen gmail\" (continuando) → consultar

Responde SOLO con una de estas palabras (sin puntuación ni espacios adicionales):
crear
consultar";

const CLASSIFIER_WITHOUT_HISTORY_ES: &str = "\
Eres un recepcionista de un sistema de gestión de clientes.

Clasifica la intención del usuario en UNA palabra:

- crear → registrar, agregar, guardar, añadir clientes
- consultar → listar, ver, buscar, mostrar clientes

Responde SOLO con una de estas palabras (sin puntuación ni espacios adicionales):
crear
consultar";

const CLASSIFIER_WITH_HISTORY_EN: &str = "\
You are the receptionist of a customer management system.

Classify the user's intent in ONE word, taking the conversation so far into account:

- create → register, add, save new customers
- query → list, view, search, show customers

IMPORTANT: Consider the conversation history. If the user is supplying more details for \
an earlier request, keep the same intent.

Examples:
- User: \"Create a customer\" → create
- User: \"His name is John\" (continuing) → create
- User: \"List the customers\" → query
- User: \"Only the ones using gmail\" (continuing) → query

Answer ONLY with one of these words (no punctuation or extra spaces):
create
query";

const CLASSIFIER_WITHOUT_HISTORY_EN: &str = "\
You are the receptionist of a customer management system.

Classify the user's intent in ONE word:

- create → register, add, save new customers
- query → list, view, search, show customers

Answer ONLY with one of these words (no punctuation or extra spaces):
create
query";

/// System prompt for the history-aware classification call.
pub fn classifier_with_history(locale: Locale) -> &'static str {
    match locale {
        Locale::Es => CLASSIFIER_WITH_HISTORY_ES,
        Locale::En => CLASSIFIER_WITH_HISTORY_EN,
    }
}

/// System prompt for the fallback call, which sees only the current message.
pub fn classifier_without_history(locale: Locale) -> &'static str {
    match locale {
        Locale::Es => CLASSIFIER_WITHOUT_HISTORY_ES,
        Locale::En => CLASSIFIER_WITHOUT_HISTORY_EN,
    }
}

/// Instructions prepended to every capability agent run.
pub fn agent_prefix(capability: Capability, locale: Locale) -> &'static str {
    match (capability, locale) {
        (Capability::Create, Locale::Es) => "\
Eres un agente que SOLO crea clientes.

IMPORTANTE: Antes de preguntar información, REVISA EL HISTORIAL DE LA CONVERSACIÓN.
El usuario puede haber proporcionado el nombre o email en mensajes anteriores.

Proceso:
1. Revisa el historial completo de la conversación
2. Extrae el nombre si ya fue mencionado
3. Extrae el email si ya fue mencionado
4. Si tienes AMBOS (nombre Y email), ejecuta la herramienta create_customer
5. Si falta alguno, pregunta SOLO por lo que falta

NO repitas preguntas que ya fueron respondidas en el historial.",
        (Capability::Create, Locale::En) => "\
You are an agent that ONLY creates customers.

IMPORTANT: Before asking for anything, REVIEW THE CONVERSATION HISTORY.
The user may already have given the name or the email in earlier messages.

Process:
1. Review the whole conversation
2. Extract the name if it was already mentioned
3. Extract the email if it was already mentioned
4. If you have BOTH (name AND email), call the create_customer tool
5. If one is missing, ask ONLY for what is missing

Do NOT repeat questions that were already answered.",
        (Capability::Query, Locale::Es) => "\
Eres un agente que SOLO consulta información de clientes.

IMPORTANTE: Revisa el historial de la conversación para entender el contexto completo.
El usuario puede estar refinando o filtrando una consulta anterior.

Proceso:
1. Revisa el historial para entender qué información busca el usuario
2. Utiliza la herramienta list_customers para obtener la lista
3. Si el usuario pidió un filtro (por ejemplo, \"solo los que tienen gmail\"), pásalo como filter
4. Presenta la información de forma clara y organizada",
        (Capability::Query, Locale::En) => "\
You are an agent that ONLY looks up customer information.

IMPORTANT: Review the conversation history to understand the full context.
The user may be refining or filtering an earlier query.

Process:
1. Review the history to understand what the user is looking for
2. Use the list_customers tool to get the list
3. If the user asked for a filter (e.g. \"only the gmail ones\"), pass it as filter
4. Present the information clearly",
    }
}

/// Labels used by the context enricher.
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentLabels {
    pub header: &'static str,
    pub user: &'static str,
    pub assistant: &'static str,
    pub current: &'static str,
    pub create_instruction: &'static str,
    pub query_instruction: &'static str,
}

impl EnrichmentLabels {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::Es => Self {
                header: "Contexto de la conversación anterior:",
                user: "Usuario dijo:",
                assistant: "Asistente respondió:",
                current: "Mensaje actual del usuario:",
                create_instruction: "IMPORTANTE: Revisa el contexto anterior para extraer nombre y email si ya fueron mencionados.",
                query_instruction: "IMPORTANTE: Revisa el contexto anterior para entender qué información busca el usuario.",
            },
            Locale::En => Self {
                header: "Previous conversation context:",
                user: "User said:",
                assistant: "Assistant replied:",
                current: "Current user message:",
                create_instruction: "IMPORTANT: Check the previous context to extract the name and email if they were already mentioned.",
                query_instruction: "IMPORTANT: Check the previous context to understand what information the user is looking for.",
            },
        }
    }

    pub fn instruction(&self, purpose: Capability) -> &'static str {
        match purpose {
            Capability::Create => self.create_instruction,
            Capability::Query => self.query_instruction,
        }
    }
}

/// Reply when the classifier answered with neither label.
pub fn clarification(locale: Locale) -> &'static str {
    match locale {
        Locale::Es => "❓ No entendí la solicitud. Por favor, reformula tu mensaje.",
        Locale::En => "❓ I didn't understand the request. Please rephrase your message.",
    }
}

/// Reply when classification failed on both paths.
pub fn apology(locale: Locale) -> &'static str {
    match locale {
        Locale::Es => "❌ Lo siento, hubo un error al procesar la solicitud. Inténtalo de nuevo.",
        Locale::En => "❌ Sorry, something went wrong while processing the request. Please try again.",
    }
}

/// Reply when a capability agent failed; `error` is included verbatim.
pub fn agent_error(capability: Capability, locale: Locale, error: &str) -> String {
    match (locale, capability) {
        (Locale::Es, Capability::Create) => format!("❌ Error en agente crear: {error}"),
        (Locale::Es, Capability::Query) => format!("❌ Error en agente consultar: {error}"),
        (Locale::En, Capability::Create) => format!("❌ Error in create agent: {error}"),
        (Locale::En, Capability::Query) => format!("❌ Error in query agent: {error}"),
    }
}
