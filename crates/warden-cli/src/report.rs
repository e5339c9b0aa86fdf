// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::io::{self, Write};

use warden_provisioning::NewAccount;

/// Print the operator summary. The only place the temporary password is
/// shown.
pub fn write_summary<W: Write>(out: &mut W, uid: &str, account: &NewAccount) -> io::Result<()> {
	writeln!(out)?;
	writeln!(out, "=== Account Created ===")?;
	writeln!(out, "UID         : {uid}")?;
	writeln!(out, "Email       : {}", account.email)?;
	writeln!(out, "Username    : {}", account.username)?;
	writeln!(out, "Role        : {}", account.role)?;
	writeln!(out, "Temp Password: (copy and share securely)")?;
	writeln!(out, "{}", account.temp_password.expose())?;
	writeln!(out)?;
	writeln!(out, "Security tip: ask the user to sign in and change password immediately.")?;
	writeln!(out)?;
	out.flush()
}
