//! Prompt templates for analysis and follow-up chat.
//!
//! Both builders are pure functions of their inputs. The templates are in
//! Spanish, matching the product's user-facing language.

/// Probe text used by `test_connection`; the provider is expected to echo
/// "exitosa" back.
pub const CONNECTION_PROBE: &str = "Responde con: 'Conexión exitosa'";

/// Builds the accounting-analysis prompt around the formatted tabular
/// data, with an optional extra instruction from the user.
///
/// The response schema block doubles as a worked example so the provider
/// anchors on the exact JSON shape.
pub fn build_analysis_prompt(tabular_data: &str, custom_prompt: Option<&str>) -> String {
    let extra = match custom_prompt {
        Some(text) if !text.trim().is_empty() => {
            format!("\nINSTRUCCIONES ADICIONALES: {text}\n")
        }
        _ => String::new(),
    };

    format!(
        r#"Eres un experto contador y auditor especializado en análisis de cuadres contables.

Analiza los siguientes datos de Excel y detecta posibles errores en cuadres contables:

DATOS DEL ARCHIVO:
{tabular_data}

INSTRUCCIONES:
1. Verifica que los débitos y créditos cuadren (identidad contable)
2. Revisa la consistencia de las tasas de comisión aplicadas
3. Detecta saldos negativos que puedan pasar inadvertidos
4. Revisa la coherencia entre diferentes hojas o tablas
5. Detecta valores faltantes o anómalos
{extra}
IMPORTANTE: Responde ÚNICAMENTE con un JSON válido en el siguiente formato:
{{
    "success": true,
    "findings": [
        {{
            "type": "error|warning|info",
            "title": "Título del hallazgo",
            "description": "Descripción detallada",
            "location": "Ubicación en el archivo (hoja y fila)",
            "severity": "high|medium|low",
            "suggested_fix": "Sugerencia de corrección"
        }}
    ],
    "recommendations": [
        {{
            "title": "Título de recomendación",
            "description": "Descripción de la recomendación",
            "priority": "high|medium|low",
            "category": "calculation|format|process|validation"
        }}
    ],
    "summary": "Resumen ejecutivo del análisis",
    "metadata": {{
        "total_findings": 0,
        "critical_issues": 0,
        "sheets_analyzed": 0
    }}
}}

NO incluyas texto adicional fuera del JSON. Solo responde con el JSON."#
    )
}

/// Builds the follow-up chat prompt around an assembled session context.
pub fn build_chat_prompt(context: &str, user_message: &str) -> String {
    format!(
        r#"Eres un experto contador y auditor especializado en análisis de cuadres contables.

CONTEXTO DEL ANÁLISIS PREVIO:
{context}

INSTRUCCIONES:
- Responde a la pregunta del usuario basándote en el análisis previo
- Sé específico y usa la información del análisis
- Cita la ubicación exacta (hoja y fila) del contexto cuando sea relevante
- Si la pregunta no está relacionada con el análisis, redirige al usuario
- Mantén un tono profesional pero amigable

PREGUNTA DEL USUARIO:
{user_message}

RESPUESTA:"#
    )
}
