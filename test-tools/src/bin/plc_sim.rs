/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Stand-in field PLC for bench testing.
//!
//! Serves Modbus/TCP with the engine's own I/O map.  Inputs and registers
//! follow the scripted match simulation; coil writes are logged whenever
//! they change.

use std::future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Instant;
use tokio_modbus::server::tcp::{accept_tcp_connection, Server};
use tokio_modbus::server::Service;
use tokio_modbus::{ExceptionCode, Request, Response};
use tracing::{debug, info, warn};

use fms_engine::plc::io::{coil_names, COIL_COUNT};
use fms_engine::plc::modbus::MODBUS_PORT;
use fms_engine::plc::simulation::simulated_match_time;
use fms_engine::plc::Plc;

#[derive(Debug, Parser)]
#[command(name = "plc-sim", about = "Simulated field PLC (Modbus/TCP) – not for production")]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Modbus/TCP port.
    #[arg(short, long, default_value_t = MODBUS_PORT)]
    port: u16,
}

struct Field {
    plc: Plc,
    coils: Mutex<[bool; COIL_COUNT]>,
}

impl Field {
    fn handle(&self, request: Request<'static>) -> Result<Response, ExceptionCode> {
        let image = self.plc.io_image();
        match request {
            Request::ReadDiscreteInputs(address, quantity) => image
                .inputs
                .get(span(address, quantity))
                .map(|bits| Response::ReadDiscreteInputs(bits.to_vec()))
                .ok_or(ExceptionCode::IllegalDataAddress),
            Request::ReadHoldingRegisters(address, quantity) => image
                .registers
                .get(span(address, quantity))
                .map(|words| Response::ReadHoldingRegisters(words.to_vec()))
                .ok_or(ExceptionCode::IllegalDataAddress),
            Request::WriteMultipleCoils(address, values) => {
                let quantity = values.len() as u16;
                let range = span(address, quantity);
                if range.end > COIL_COUNT {
                    return Err(ExceptionCode::IllegalDataAddress);
                }
                let mut coils = self.coils.lock().unwrap_or_else(|e| e.into_inner());
                if coils[range.clone()] != values[..] {
                    coils[range].copy_from_slice(&values);
                    let on: Vec<&str> = coil_names()
                        .into_iter()
                        .zip(coils.iter())
                        .filter(|(_, on)| **on)
                        .map(|(name, _)| name)
                        .collect();
                    info!(coils = ?on, "coils changed");
                }
                Ok(Response::WriteMultipleCoils(address, quantity))
            }
            other => {
                debug!(request = ?other, "unsupported request");
                Err(ExceptionCode::IllegalFunction)
            }
        }
    }
}

fn span(address: u16, quantity: u16) -> std::ops::Range<usize> {
    address as usize..address as usize + quantity as usize
}

/// One Modbus session; all sessions share the same field.
#[derive(Clone)]
struct PlcService {
    field: Arc<Field>,
}

impl Service for PlcService {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Response, ExceptionCode>>;

    fn call(&self, request: Request<'static>) -> Self::Future {
        future::ready(self.field.handle(request))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let field = Arc::new(Field {
        plc: Plc::new(""),
        coils: Mutex::new([false; COIL_COUNT]),
    });

    // Match clock for the scripted inputs.
    let clock_field = field.clone();
    tokio::spawn(async move {
        let start = Instant::now();
        let mut previous = 0.0;
        let mut ticker = tokio::time::interval(Duration::from_millis(100));
        loop {
            ticker.tick().await;
            let match_time = simulated_match_time(start.elapsed());
            if match_time < previous {
                clock_field.plc.simulate_input(0.0);
            }
            previous = match_time;
            clock_field.plc.simulate_input(match_time);
        }
    });

    let address = format!("{}:{}", cli.bind, cli.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Cannot listen on {}", address))?;
    info!(%address, "PLC simulator listening");

    let service = PlcService { field };
    let on_connected = move |stream: TcpStream, peer: SocketAddr| {
        let service = service.clone();
        async move {
            info!(%peer, "client connected");
            accept_tcp_connection(stream, peer, move |_| Ok(Some(service.clone())))
        }
    };
    Server::new(listener)
        .serve(&on_connected, |e| warn!(error = %e, "connection closed"))
        .await
        .context("Modbus server failed")?;
    Ok(())
}
