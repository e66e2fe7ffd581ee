// --- File: crates/pixbridge_inter/src/mappers.rs ---
//! Stateless translation between the provider's wire schema and the public
//! and domain types. Unknown status strings are errors, never defaulted.

use chrono::{DateTime, Utc};
use pixbridge_common::{ChargeState, SettlementRecord, TransactionStatus};

use crate::error::InterError;
use crate::models::{
    AdditionalInfo, AuthorizationStatus, AuthorizeRecurringChargeResponse, ChargeCalendar,
    ChargeDebtor, ChargeLocation, ChargeResponse, ChargeValue, CreateRecurringChargeRequest,
    RecurringCalendar, RecurringChargeResponse, RecurringChargeStatus, RecurringDebtor,
    RecurringReceiver, RecurringValue,
};
use crate::wire;

pub fn charge_status_from_wire(status: &str) -> Result<TransactionStatus, InterError> {
    match status {
        "ATIVA" => Ok(TransactionStatus::Active),
        "CONCLUIDA" => Ok(TransactionStatus::Completed),
        "REMOVIDA_PELO_USUARIO_RECEBEDOR" => Ok(TransactionStatus::RemovedByUser),
        "REMOVIDA_PELO_PSP" => Ok(TransactionStatus::RemovedByPsp),
        other => Err(InterError::UnrecognizedStatus(other.to_string())),
    }
}

pub fn recurring_status_from_wire(status: &str) -> Result<RecurringChargeStatus, InterError> {
    match status {
        "EM_PROCESSAMENTO" => Ok(RecurringChargeStatus::Processing),
        other => charge_status_from_wire(other).map(|status| match status {
            TransactionStatus::Active => RecurringChargeStatus::Active,
            TransactionStatus::Completed => RecurringChargeStatus::Completed,
            TransactionStatus::RemovedByUser => RecurringChargeStatus::RemovedByUser,
            TransactionStatus::RemovedByPsp => RecurringChargeStatus::RemovedByPsp,
        }),
    }
}

pub fn authorization_status_from_wire(status: &str) -> Result<AuthorizationStatus, InterError> {
    match status {
        "AUTORIZADA" => Ok(AuthorizationStatus::Authorized),
        "NEGADA" => Ok(AuthorizationStatus::Denied),
        other => Err(InterError::UnrecognizedStatus(other.to_string())),
    }
}

fn location_from_wire(loc: wire::Loc) -> ChargeLocation {
    ChargeLocation {
        id: loc.id,
        location: loc.location,
        charge_type: loc.tipo_cob,
        creation: loc.criacao,
    }
}

pub fn charge_to_public(charge: wire::Cob) -> Result<ChargeResponse, InterError> {
    Ok(ChargeResponse {
        status: charge_status_from_wire(&charge.status)?,
        calendar: ChargeCalendar {
            creation: charge.calendario.criacao,
            expiration: charge.calendario.expiracao,
        },
        txid: charge.txid,
        revision: charge.revisao,
        location: charge.loc.map(location_from_wire),
        debtor: charge.devedor.map(|d| ChargeDebtor {
            cpf: d.cpf,
            cnpj: d.cnpj,
            name: d.nome,
        }),
        value: ChargeValue {
            original: charge.valor.original,
        },
        key: charge.chave,
        payer_request: charge.solicitacao_pagador,
        pix_copy_paste: charge.pix_copia_e_cola,
    })
}

pub fn charge_to_state(charge: &wire::Cob) -> Result<ChargeState, InterError> {
    Ok(ChargeState {
        txid: charge.txid.clone(),
        status: charge_status_from_wire(&charge.status)?,
        amount: charge.valor.original.clone(),
        pix_copy_paste: charge.pix_copia_e_cola.clone(),
    })
}

/// `default_key` fills in the receiving Pix key when the request omits it.
pub fn recurring_request_to_wire(
    request: CreateRecurringChargeRequest,
    default_key: &str,
) -> wire::CobvRequest {
    wire::CobvRequest {
        calendario: wire::CobvCalendario {
            data_de_vencimento: request.calendar.due_date,
            validade_apos_vencimento: request.calendar.validity_after_due,
            criacao: None,
        },
        devedor: wire::Devedor {
            cpf: request.debtor.cpf,
            cnpj: request.debtor.cnpj,
            nome: request.debtor.name,
            logradouro: request.debtor.address,
            cidade: request.debtor.city,
            uf: request.debtor.state,
            cep: request.debtor.zip_code,
        },
        valor: wire::CobvValor {
            original: request.value.original,
            modalidade_alteracao: request.value.change_mode,
        },
        chave: request.key.unwrap_or_else(|| default_key.to_string()),
        solicitacao_pagador: request.payer_request,
        info_adicionais: request.additional_info.map(|infos| {
            infos
                .into_iter()
                .map(|info| wire::InfoAdicional {
                    nome: info.name,
                    valor: info.value,
                })
                .collect()
        }),
    }
}

pub fn recurring_charge_to_public(
    charge: wire::Cobv,
) -> Result<RecurringChargeResponse, InterError> {
    let status = charge
        .status
        .as_deref()
        .map(recurring_status_from_wire)
        .transpose()?;

    Ok(RecurringChargeResponse {
        calendar: RecurringCalendar {
            due_date: charge.calendario.data_de_vencimento,
            validity_after_due: charge.calendario.validade_apos_vencimento,
            creation: charge.calendario.criacao,
        },
        txid: charge.txid,
        revision: charge.revisao,
        location: charge.loc.map(location_from_wire),
        status,
        debtor: RecurringDebtor {
            cpf: charge.devedor.cpf,
            cnpj: charge.devedor.cnpj,
            name: charge.devedor.nome,
            address: charge.devedor.logradouro,
            city: charge.devedor.cidade,
            state: charge.devedor.uf,
            zip_code: charge.devedor.cep,
        },
        receiver: charge.recebedor.map(|r| RecurringReceiver {
            address: r.logradouro,
            city: r.cidade,
            state: r.uf,
            zip_code: r.cep,
            cnpj: r.cnpj,
            name: r.nome,
        }),
        value: RecurringValue {
            original: charge.valor.original,
            change_mode: charge.valor.modalidade_alteracao,
        },
        key: charge.chave,
        payer_request: charge.solicitacao_pagador,
        additional_info: charge.info_adicionais.map(|infos| {
            infos
                .into_iter()
                .map(|info| AdditionalInfo {
                    name: info.nome,
                    value: info.valor,
                })
                .collect()
        }),
        pix_copy_paste: charge.pix_copia_e_cola,
    })
}

pub fn authorization_to_public(
    response: wire::AutorizacaoResponse,
) -> Result<AuthorizeRecurringChargeResponse, InterError> {
    Ok(AuthorizeRecurringChargeResponse {
        status: authorization_status_from_wire(&response.status)?,
        txid: response.txid,
        revision: response.revisao,
    })
}

/// The payer's CPF is preferred over the CNPJ when both are present.
pub fn settlement_from_wire(pix: wire::PixRecebido) -> Result<SettlementRecord, InterError> {
    let paid_at = pix
        .horario
        .as_deref()
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| InterError::MissingField(format!("horario '{}': {}", raw, e)))
        })
        .transpose()?;
    let payer_tax_id = pix
        .pagador
        .and_then(|p| p.cpf.or(p.cnpj))
        .filter(|id| !id.is_empty());

    Ok(SettlementRecord {
        end_to_end_id: pix.end_to_end_id,
        txid: pix.txid,
        amount: pix.valor,
        paid_at,
        payer_tax_id,
    })
}
