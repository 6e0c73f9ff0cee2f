/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Modbus/TCP master for the field PLC, on top of `tokio-modbus`.
//!
//! The PLC loop only needs three function codes:
//!
//! | Code | Operation |
//! |---|---|
//! | `0x02` | read discrete inputs |
//! | `0x03` | read holding registers |
//! | `0x0F` | write multiple coils |
//!
//! Every operation is bounded by the client's operation timeout.  A reply
//! carrying a Modbus exception surfaces as [`ModbusError::Exception`].

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::net::lookup_host;
use tokio::time::timeout;
use tokio_modbus::client::{tcp, Context, Reader, Writer};
use tokio_modbus::{ExceptionCode, Slave};
use tracing::debug;

pub const MODBUS_PORT: u16 = 502;
pub const PLC_UNIT_ID: u8 = 0xFF;
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(1);

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ModbusError {
    #[error("modbus I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("modbus transport error: {0}")]
    Transport(#[from] tokio_modbus::Error),

    #[error("modbus {operation} timed out after {timeout:?}")]
    Timeout { operation: &'static str, timeout: Duration },

    #[error("modbus {operation} rejected with exception {code:?}")]
    Exception { operation: &'static str, code: ExceptionCode },

    #[error("unexpected modbus reply: {0}")]
    Protocol(String),
}

// ── Client ────────────────────────────────────────────────────────────────────

/// The subset of a Modbus master the PLC loop needs.
pub trait ModbusClient: Send {
    fn read_discrete_inputs(
        &mut self,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = Result<Vec<bool>, ModbusError>> + Send;

    fn read_holding_registers(
        &mut self,
        address: u16,
        quantity: u16,
    ) -> impl Future<Output = Result<Vec<u16>, ModbusError>> + Send;

    fn write_multiple_coils(
        &mut self,
        address: u16,
        values: &[bool],
    ) -> impl Future<Output = Result<(), ModbusError>> + Send;
}

/// Modbus/TCP master over a single connection.
#[derive(Debug)]
pub struct TcpModbusClient {
    context: Context,
    op_timeout: Duration,
}

impl TcpModbusClient {
    /// `address` is `host:port`; the first resolved address is used.
    pub async fn connect(address: &str, slave: Slave, op_timeout: Duration) -> Result<Self, ModbusError> {
        let socket_addr = lookup_host(address)
            .await?
            .next()
            .ok_or_else(|| ModbusError::Protocol(format!("no address found for {address}")))?;
        let context = timeout(op_timeout, tcp::connect_slave(socket_addr, slave))
            .await
            .map_err(|_| ModbusError::Timeout {
                operation: "connect",
                timeout: op_timeout,
            })??;
        debug!(%socket_addr, unit = slave.0, "modbus connected");
        Ok(Self { context, op_timeout })
    }
}

/// Bounds `request` by `op_timeout` and flattens the transport and exception
/// layers of its result.
async fn bounded<T>(
    operation: &'static str,
    op_timeout: Duration,
    request: impl Future<Output = tokio_modbus::Result<T>>,
) -> Result<T, ModbusError> {
    match timeout(op_timeout, request).await {
        Err(_) => Err(ModbusError::Timeout {
            operation,
            timeout: op_timeout,
        }),
        Ok(Err(e)) => Err(e.into()),
        Ok(Ok(Err(code))) => Err(ModbusError::Exception { operation, code }),
        Ok(Ok(Ok(value))) => Ok(value),
    }
}

impl ModbusClient for TcpModbusClient {
    async fn read_discrete_inputs(&mut self, address: u16, quantity: u16) -> Result<Vec<bool>, ModbusError> {
        bounded(
            "read discrete inputs",
            self.op_timeout,
            self.context.read_discrete_inputs(address, quantity),
        )
        .await
    }

    async fn read_holding_registers(&mut self, address: u16, quantity: u16) -> Result<Vec<u16>, ModbusError> {
        bounded(
            "read holding registers",
            self.op_timeout,
            self.context.read_holding_registers(address, quantity),
        )
        .await
    }

    async fn write_multiple_coils(&mut self, address: u16, values: &[bool]) -> Result<(), ModbusError> {
        bounded(
            "write coils",
            self.op_timeout,
            self.context.write_multiple_coils(address, values),
        )
        .await
    }
}

/// Opens client connections for the PLC loop.
pub trait ModbusConnector: Send + Sync {
    type Client: ModbusClient;

    fn connect(&self, host: &str) -> impl Future<Output = Result<Self::Client, ModbusError>> + Send;
}

/// Connects to `host` on the standard Modbus port as the PLC unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl ModbusConnector for TcpConnector {
    type Client = TcpModbusClient;

    async fn connect(&self, host: &str) -> Result<TcpModbusClient, ModbusError> {
        TcpModbusClient::connect(&format!("{host}:{MODBUS_PORT}"), Slave(PLC_UNIT_ID), OPERATION_TIMEOUT).await
    }
}
