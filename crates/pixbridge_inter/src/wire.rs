// --- File: crates/pixbridge_inter/src/wire.rs ---
//! Request and response bodies exactly as the Inter Pix API (BACEN Pix v2
//! schema) spells them. Statuses stay raw strings here; turning them into
//! domain values is the mappers' job.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valor {
    pub original: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CobCalendarioRequest {
    pub expiracao: u64,
}

/// Body of `PUT /pix/v2/cob/{txid}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CobRequest {
    pub calendario: CobCalendarioRequest,
    pub valor: Valor,
    pub chave: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solicitacao_pagador: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CobCalendario {
    pub criacao: Option<String>,
    pub expiracao: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loc {
    pub id: i64,
    pub location: String,
    pub tipo_cob: String,
    pub criacao: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DevedorResumo {
    pub cpf: Option<String>,
    pub cnpj: Option<String>,
    pub nome: String,
}

/// Immediate charge (`cob`) as returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cob {
    pub calendario: CobCalendario,
    pub txid: String,
    pub revisao: Option<u32>,
    pub loc: Option<Loc>,
    pub location: Option<String>,
    pub status: String,
    pub devedor: Option<DevedorResumo>,
    pub valor: Valor,
    pub chave: Option<String>,
    pub solicitacao_pagador: Option<String>,
    pub pix_copia_e_cola: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CobvCalendario {
    pub data_de_vencimento: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validade_apos_vencimento: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criacao: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Devedor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
    pub nome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logradouro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cep: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Recebedor {
    pub logradouro: Option<String>,
    pub cidade: Option<String>,
    pub uf: Option<String>,
    pub cep: Option<String>,
    pub cnpj: Option<String>,
    pub nome: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CobvValor {
    pub original: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modalidade_alteracao: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoAdicional {
    pub nome: String,
    pub valor: String,
}

/// Body of `POST /pix/v2/cobv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CobvRequest {
    pub calendario: CobvCalendario,
    pub devedor: Devedor,
    pub valor: CobvValor,
    pub chave: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solicitacao_pagador: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_adicionais: Option<Vec<InfoAdicional>>,
}

/// Due-date charge (`cobv`) as returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cobv {
    pub calendario: CobvCalendario,
    pub txid: Option<String>,
    pub revisao: Option<u32>,
    pub loc: Option<Loc>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub devedor: Devedor,
    pub recebedor: Option<Recebedor>,
    pub valor: CobvValor,
    pub chave: String,
    pub solicitacao_pagador: Option<String>,
    pub info_adicionais: Option<Vec<InfoAdicional>>,
    pub pix_copia_e_cola: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutorizacaoRequest {
    pub txid: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AutorizacaoResponse {
    pub txid: String,
    pub status: String,
    pub revisao: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pagador {
    pub cpf: Option<String>,
    pub cnpj: Option<String>,
    pub nome: Option<String>,
}

/// One entry of `GET /pix/v2/pix`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixRecebido {
    pub end_to_end_id: String,
    pub txid: Option<String>,
    pub valor: String,
    pub horario: Option<String>,
    pub pagador: Option<Pagador>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PixRecebidos {
    #[serde(default)]
    pub pix: Vec<PixRecebido>,
}
