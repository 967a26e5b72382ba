use ms_core::assist::SignatureInfo;
use tower_lsp::lsp_types::{
    Documentation, MarkupContent, MarkupKind, ParameterInformation, ParameterLabel, SignatureHelp,
    SignatureInformation,
};

pub(crate) fn sig_owned(info: SignatureInfo) -> SignatureInformation {
    SignatureInformation {
        label: info.label,
        documentation: Some(Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::Markdown,
            value: info.documentation,
        })),
        parameters: Some(
            info.parameters
                .into_iter()
                .map(|p| ParameterInformation {
                    label: ParameterLabel::Simple(p),
                    documentation: None,
                })
                .collect(),
        ),
        active_parameter: Some(info.active_parameter),
    }
}

pub(crate) fn signature_help_for(info: SignatureInfo) -> SignatureHelp {
    let active = info.active_parameter;
    SignatureHelp {
        signatures: vec![sig_owned(info)],
        active_signature: Some(0),
        active_parameter: Some(active),
    }
}
